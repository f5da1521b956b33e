//! Per-asset technical signals for a portfolio.

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::domain::analyzer::comprehensive_analysis;
use crate::domain::composite::{weighted_signal, CategoryWeights};
use crate::domain::indicator::IndicatorResult;
use crate::domain::ohlcv::{Interval, PriceSeries};
use crate::domain::portfolio::Portfolio;
use crate::ports::data_port::DataPort;

/// Assets with fewer bars get no signals.
pub const MIN_SIGNAL_BARS: usize = 20;
/// Strongest results kept per category.
pub const SIGNALS_PER_CATEGORY: usize = 3;

/// Fetches bars for every asset, runs the full analysis and keeps the
/// strongest results per category. Each analyzed asset's `signal_strength` is
/// set to its composite score.
///
/// A fetch failure for one asset is logged and that asset gets no signals.
pub fn analyze_portfolio_signals(
    portfolio: &mut Portfolio,
    data: &dyn DataPort,
    interval: Interval,
    start: NaiveDate,
    end: NaiveDate,
    weights: &CategoryWeights,
) -> HashMap<String, Vec<IndicatorResult>> {
    let mut signals = HashMap::new();

    for symbol in portfolio.symbols() {
        let bars = match data.fetch_bars(&symbol, interval, start, end) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(%symbol, error = %e, "no data for asset, skipping signals");
                signals.insert(symbol, Vec::new());
                continue;
            }
        };

        if bars.len() < MIN_SIGNAL_BARS {
            debug!(%symbol, bars = bars.len(), "not enough bars for signals");
            signals.insert(symbol, Vec::new());
            continue;
        }

        let analysis = match comprehensive_analysis(&PriceSeries::from_bars(&bars)) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(%symbol, error = %e, "analysis failed, skipping signals");
                signals.insert(symbol, Vec::new());
                continue;
            }
        };

        let composite = weighted_signal(&analysis, weights);
        if let Some(asset) = portfolio.asset_mut(&symbol) {
            asset.set_signal_strength(composite.value, Utc::now());
        }
        debug!(%symbol, composite = composite.value, signal = %composite.signal, "asset analyzed");

        signals.insert(symbol, analysis.strongest(SIGNALS_PER_CATEGORY));
    }

    signals
}
