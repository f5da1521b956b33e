//! Weighted Moving Average.
//!
//! O(n) sliding window: the weighted sum is updated by adding n*P[new] and
//! subtracting the previous window sum.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Output length: len - n + 1; empty when len < n.

pub fn calculate_wma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;

    for (i, &price) in prices[..period].iter().enumerate() {
        weighted_sum += (i + 1) as f64 * price;
        window_sum += price;
    }

    let mut values = Vec::with_capacity(prices.len() - period + 1);
    values.push(weighted_sum / divisor);

    for i in period..prices.len() {
        weighted_sum += period as f64 * prices[i] - window_sum;
        window_sum += prices[i] - prices[i - period];
        values.push(weighted_sum / divisor);
    }

    values
}
