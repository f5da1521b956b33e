//! Average True Range.
//!
//! TR[i] = max(H[i] - L[i], |H[i] - C[i-1]|, |L[i] - C[i-1]|) for i >= 1.
//! Seed: simple mean of the first n true ranges, then Wilder smoothing
//! ATR = (prev_atr * (n-1) + TR) / n.
//!
//! Needs n + 1 bars. Output length: len - n.

use crate::domain::error::{ensure_same_len, SignalfolioError};
use crate::domain::ohlcv::true_range;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<Vec<f64>, SignalfolioError> {
    ensure_same_len("ATR", closes.len(), &[highs.len(), lows.len()])?;
    if period == 0 || closes.len() < period + 1 {
        return Ok(Vec::new());
    }

    let tr_values: Vec<f64> = (1..closes.len())
        .map(|i| true_range(highs[i], lows[i], closes[i - 1]))
        .collect();

    let mut values = Vec::with_capacity(tr_values.len() - period + 1);
    let mut atr = tr_values[..period].iter().sum::<f64>() / period as f64;
    values.push(atr);

    for &tr in &tr_values[period..] {
        atr = (atr * (period - 1) as f64 + tr) / period as f64;
        values.push(atr);
    }

    Ok(values)
}
