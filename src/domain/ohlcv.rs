//! OHLCV bar representation and the validated columnar view fed to the analyzer.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::{ensure_same_len, SignalfolioError};

/// Sampling interval of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute,
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Minute => write!(f, "1m"),
            Interval::Hourly => write!(f, "1h"),
            Interval::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "minute" => Ok(Interval::Minute),
            "1h" | "hour" | "hourly" => Ok(Interval::Hourly),
            "1d" | "day" | "daily" => Ok(Interval::Daily),
            other => Err(format!("unknown interval '{}'", other)),
        }
    }
}

/// One immutable quote for a single interval, as produced by a data port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub interval: Interval,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        true_range(self.high, self.low, prev_close)
    }
}

pub(crate) fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Columnar price data with every present column the same length as `closes`.
///
/// Highs, lows and volumes are optional; indicators that need them are
/// skipped by the analyzer when they are absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    closes: Vec<f64>,
    highs: Option<Vec<f64>>,
    lows: Option<Vec<f64>>,
    volumes: Option<Vec<f64>>,
}

impl PriceSeries {
    pub fn new(
        closes: Vec<f64>,
        highs: Option<Vec<f64>>,
        lows: Option<Vec<f64>>,
        volumes: Option<Vec<f64>>,
    ) -> Result<Self, SignalfolioError> {
        let others: Vec<usize> = [&highs, &lows, &volumes]
            .iter()
            .filter_map(|col| col.as_ref().map(Vec::len))
            .collect();
        ensure_same_len("PriceSeries", closes.len(), &others)?;
        Ok(Self {
            closes,
            highs,
            lows,
            volumes,
        })
    }

    /// Closing prices only.
    pub fn from_closes(closes: Vec<f64>) -> Self {
        Self {
            closes,
            ..Self::default()
        }
    }

    /// Splits bars into columns. Bars are taken in the order given.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        Self {
            closes: bars.iter().map(|b| b.close).collect(),
            highs: Some(bars.iter().map(|b| b.high).collect()),
            lows: Some(bars.iter().map(|b| b.low).collect()),
            volumes: Some(bars.iter().map(|b| b.volume).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn highs(&self) -> Option<&[f64]> {
        self.highs.as_deref()
    }

    pub fn lows(&self) -> Option<&[f64]> {
        self.lows.as_deref()
    }

    pub fn volumes(&self) -> Option<&[f64]> {
        self.volumes.as_deref()
    }

    /// Highs and lows together, when both are present.
    pub fn high_low(&self) -> Option<(&[f64], &[f64])> {
        Some((self.highs()?, self.lows()?))
    }
}
