//! Chaikin Money Flow.
//!
//! MFM = ((C - L) - (H - C)) / (H - L), 0 for a bar with H == L
//! CMF(n) = sum(MFM * V) / sum(V) over the window; 0 when sum(V) == 0.
//!
//! Default period: 21. Output length: len - n + 1.

use crate::domain::error::{ensure_same_len, SignalfolioError};

pub const DEFAULT_PERIOD: usize = 21;

pub fn calculate_cmf(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
    period: usize,
) -> Result<Vec<f64>, SignalfolioError> {
    ensure_same_len(
        "CMF",
        closes.len(),
        &[highs.len(), lows.len(), volumes.len()],
    )?;
    if period == 0 || closes.len() < period {
        return Ok(Vec::new());
    }

    let money_flow: Vec<f64> = (0..closes.len())
        .map(|i| {
            let (h, l, c) = (highs[i], lows[i], closes[i]);
            let multiplier = if h == l {
                0.0
            } else {
                ((c - l) - (h - c)) / (h - l)
            };
            multiplier * volumes[i]
        })
        .collect();

    Ok((period - 1..closes.len())
        .map(|i| {
            let start = i + 1 - period;
            let volume: f64 = volumes[start..=i].iter().sum();
            if volume == 0.0 {
                0.0
            } else {
                money_flow[start..=i].iter().sum::<f64>() / volume
            }
        })
        .collect())
}
