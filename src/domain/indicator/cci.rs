//! Commodity Channel Index.
//!
//! TP = (H + L + C) / 3
//! CCI(n) = (TP[i] - SMA(TP, n)) / (0.015 * mean |TP - SMA(TP, n)|); 0 when
//! the mean deviation is zero.
//!
//! Default period: 20. Output length: len - n + 1.

use crate::domain::error::{ensure_same_len, SignalfolioError};

pub const DEFAULT_PERIOD: usize = 20;
const LAMBERT_CONSTANT: f64 = 0.015;

pub fn calculate_cci(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<Vec<f64>, SignalfolioError> {
    ensure_same_len("CCI", closes.len(), &[highs.len(), lows.len()])?;
    if period == 0 || closes.len() < period {
        return Ok(Vec::new());
    }

    let typical: Vec<f64> = (0..closes.len())
        .map(|i| (highs[i] + lows[i] + closes[i]) / 3.0)
        .collect();

    Ok(typical
        .windows(period)
        .map(|window| {
            let mean = window.iter().sum::<f64>() / period as f64;
            let mean_dev = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
            if mean_dev == 0.0 {
                0.0
            } else {
                (window[period - 1] - mean) / (LAMBERT_CONSTANT * mean_dev)
            }
        })
        .collect())
}
