//! Simple Moving Average.
//!
//! SMA(n)[i] = (P[i] + ... + P[i+n-1]) / n
//! Output length: len - n + 1; empty when len < n.

pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let mut values = Vec::with_capacity(prices.len() - period + 1);
    let mut window_sum: f64 = prices[..period].iter().sum();
    values.push(window_sum / period as f64);

    for i in period..prices.len() {
        window_sum += prices[i] - prices[i - period];
        values.push(window_sum / period as f64);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_regression_case() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(sma.len(), 3);
        assert!((sma[2] - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_basic_values() {
        let sma = calculate_sma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(sma.len(), 3);
        assert!((sma[0] - 20.0).abs() < 1e-12);
        assert!((sma[1] - 30.0).abs() < 1e-12);
        assert!((sma[2] - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_insufficient_data() {
        assert!(calculate_sma(&[1.0, 2.0], 3).is_empty());
        assert!(calculate_sma(&[], 1).is_empty());
    }

    #[test]
    fn sma_period_0() {
        assert!(calculate_sma(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn sma_period_equals_len() {
        let sma = calculate_sma(&[2.0, 4.0, 6.0], 3);
        assert_eq!(sma, vec![4.0]);
    }

    #[test]
    fn sma_does_not_touch_input() {
        let prices = vec![5.0, 6.0, 7.0];
        let first = calculate_sma(&prices, 2);
        let second = calculate_sma(&prices, 2);
        assert_eq!(first, second);
        assert_eq!(prices, vec![5.0, 6.0, 7.0]);
    }
}
