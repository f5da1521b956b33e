//! Technical indicator library.
//!
//! Every function is pure: it reads the input slices and returns a fresh
//! vector aligned to the tail of the input. Too few input points yield an
//! empty vector. Functions that take several parallel series (highs, lows,
//! closes, volumes) fail with [`SignalfolioError::LengthMismatch`] when the
//! slices differ in length instead of truncating.
//!
//! This module also defines the per-indicator verdict types shared by the
//! analyzer and the composite aggregator:
//! - `Signal`: directional verdict
//! - `IndicatorResult`: verdict, strength and supporting numbers for one indicator
//!
//! [`SignalfolioError::LengthMismatch`]: crate::domain::error::SignalfolioError::LengthMismatch

pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod cmf;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod williams;
pub mod wma;

pub use atr::calculate_atr;
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use cci::calculate_cci;
pub use cmf::calculate_cmf;
pub use ema::calculate_ema;
pub use macd::{calculate_macd, Macd};
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;
pub use stochastic::{calculate_stochastic, Stochastic};
pub use williams::calculate_williams_r;
pub use wma::calculate_wma;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    Neutral,
    Caution,
}

impl Signal {
    /// Directional score: BUY = +1, SELL = -1, everything else 0.
    pub fn score(self) -> f64 {
        match self {
            Signal::Buy => 1.0,
            Signal::Sell => -1.0,
            Signal::Hold | Signal::Neutral | Signal::Caution => 0.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::Neutral => "NEUTRAL",
            Signal::Caution => "CAUTION",
        };
        f.write_str(s)
    }
}

/// Verdict for one indicator evaluated at the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub name: String,
    pub value: f64,
    pub signal: Signal,
    /// Confidence in `signal`, in [0, 1].
    pub strength: f64,
    pub metadata: BTreeMap<String, f64>,
}

impl IndicatorResult {
    /// Strength is clamped to [0, 1].
    pub fn new(name: impl Into<String>, value: f64, signal: Signal, strength: f64) -> Self {
        IndicatorResult {
            name: name.into(),
            value,
            signal,
            strength: strength.clamp(0.0, 1.0),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: f64) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Last element and the one before it, when at least two exist.
pub(crate) fn last_two(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [.., prev, last] => Some((*prev, *last)),
        _ => None,
    }
}
