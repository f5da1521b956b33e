//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow), tails aligned
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line, over the signal line's span
//!
//! Default parameters: fast=12, slow=26, signal=9. With the defaults the
//! histogram has len - 33 points.

use super::ema::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}

pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
    let ema_fast = calculate_ema(prices, fast);
    let ema_slow = calculate_ema(prices, slow);
    let len = ema_fast.len().min(ema_slow.len());
    if len == 0 {
        return Macd::default();
    }

    let fast_tail = &ema_fast[ema_fast.len() - len..];
    let slow_tail = &ema_slow[ema_slow.len() - len..];
    let line: Vec<f64> = fast_tail
        .iter()
        .zip(slow_tail)
        .map(|(f, s)| f - s)
        .collect();

    let signal = calculate_ema(&line, signal_period);
    let histogram: Vec<f64> = line[line.len() - signal.len()..]
        .iter()
        .zip(&signal)
        .map(|(m, s)| m - s)
        .collect();

    Macd {
        line,
        signal,
        histogram,
    }
}
