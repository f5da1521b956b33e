//! Stochastic Oscillator.
//!
//! %K[i] = (C[i] - LL(k)) / (HH(k) - LL(k)) * 100, where HH/LL are the highest
//! high and lowest low over the last k bars. %K = 50 when HH == LL.
//! %D = SMA(d) of %K.
//!
//! Default parameters: k=14, d=3.

use super::sma::calculate_sma;
use crate::domain::error::{ensure_same_len, SignalfolioError};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Result<Stochastic, SignalfolioError> {
    ensure_same_len("Stochastic", closes.len(), &[highs.len(), lows.len()])?;
    if k_period == 0 || closes.len() < k_period {
        return Ok(Stochastic::default());
    }

    let k: Vec<f64> = (k_period - 1..closes.len())
        .map(|i| {
            let start = i + 1 - k_period;
            let (lowest, highest) = range(&highs[start..=i], &lows[start..=i]);
            if highest == lowest {
                50.0
            } else {
                (closes[i] - lowest) / (highest - lowest) * 100.0
            }
        })
        .collect();
    let d = calculate_sma(&k, d_period);

    Ok(Stochastic { k, d })
}

/// (lowest low, highest high) over a window.
pub(crate) fn range(highs: &[f64], lows: &[f64]) -> (f64, f64) {
    let highest = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = lows.iter().copied().fold(f64::INFINITY, f64::min);
    (lowest, highest)
}
