//! Williams %R.
//!
//! %R[i] = (HH(n) - C[i]) / (HH(n) - LL(n)) * -100, in [-100, 0].
//! %R = -50 when HH == LL.

use super::stochastic::range;
use crate::domain::error::{ensure_same_len, SignalfolioError};

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_williams_r(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<Vec<f64>, SignalfolioError> {
    ensure_same_len("Williams %R", closes.len(), &[highs.len(), lows.len()])?;
    if period == 0 || closes.len() < period {
        return Ok(Vec::new());
    }

    Ok((period - 1..closes.len())
        .map(|i| {
            let start = i + 1 - period;
            let (lowest, highest) = range(&highs[start..=i], &lows[start..=i]);
            if highest == lowest {
                -50.0
            } else {
                (highest - closes[i]) / (highest - lowest) * -100.0
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn williams_close_at_high_is_zero() {
        let r = calculate_williams_r(&[10.0, 12.0], &[8.0, 9.0], &[9.0, 12.0], 2).unwrap();
        assert_eq!(r.len(), 1);
        assert!(r[0].abs() < f64::EPSILON);
    }

    #[test]
    fn williams_close_at_low_is_minus_100() {
        let r = calculate_williams_r(&[10.0, 12.0], &[8.0, 9.0], &[9.0, 8.0], 2).unwrap();
        assert!((r[0] + 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn williams_zero_range() {
        let flat = [7.0; 4];
        let r = calculate_williams_r(&flat, &flat, &flat, 3).unwrap();
        assert_eq!(r, vec![-50.0, -50.0]);
    }

    #[test]
    fn williams_insufficient_data() {
        assert!(calculate_williams_r(&[1.0], &[1.0], &[1.0], 2).unwrap().is_empty());
    }

    #[test]
    fn williams_mismatched_lengths_fail() {
        assert!(calculate_williams_r(&[1.0, 2.0], &[1.0, 2.0], &[1.0], 1).is_err());
    }
}
