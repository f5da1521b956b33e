//! Composite signal aggregation.
//!
//! Every indicator contributes `score * strength * category_weight`, where
//! score is +1 for BUY, -1 for SELL and 0 otherwise. The sum is divided by the
//! total weight of the indicators that contributed, so categories with no
//! indicators drop out of the denominator and the result stays in [-1, 1].

use std::collections::HashMap;

use serde::Serialize;

use super::analyzer::{CategoryAnalysis, IndicatorCategory};
use super::indicator::{IndicatorResult, Signal};

pub const COMPOSITE_NAME: &str = "Composite_Signal";

/// Weight given to a category absent from a weight mapping.
pub const MISSING_CATEGORY_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryWeights {
    pub trend: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub volume: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        CategoryWeights {
            trend: 0.4,
            momentum: 0.3,
            volatility: 0.2,
            volume: 0.1,
        }
    }
}

impl CategoryWeights {
    /// Builds weights from a category-name mapping such as an agent weight row.
    pub fn from_map(weights: &HashMap<String, f64>) -> Self {
        let lookup = |category: IndicatorCategory| {
            weights
                .get(category.name())
                .copied()
                .unwrap_or(MISSING_CATEGORY_WEIGHT)
        };
        CategoryWeights {
            trend: lookup(IndicatorCategory::Trend),
            momentum: lookup(IndicatorCategory::Momentum),
            volatility: lookup(IndicatorCategory::Volatility),
            volume: lookup(IndicatorCategory::Volume),
        }
    }

    pub fn weight(&self, category: IndicatorCategory) -> f64 {
        match category {
            IndicatorCategory::Trend => self.trend,
            IndicatorCategory::Momentum => self.momentum,
            IndicatorCategory::Volatility => self.volatility,
            IndicatorCategory::Volume => self.volume,
        }
    }
}

/// Score cutoffs for the composite verdict. BUY above `buy`, SELL below `sell`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeThresholds {
    pub buy: f64,
    pub sell: f64,
}

impl Default for CompositeThresholds {
    fn default() -> Self {
        CompositeThresholds::symmetric(0.3)
    }
}

impl CompositeThresholds {
    pub fn symmetric(threshold: f64) -> Self {
        CompositeThresholds {
            buy: threshold,
            sell: -threshold,
        }
    }

    pub fn classify(&self, score: f64) -> Signal {
        if score > self.buy {
            Signal::Buy
        } else if score < self.sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

/// Composite signal with the default 0.3 thresholds.
pub fn weighted_signal(analysis: &CategoryAnalysis, weights: &CategoryWeights) -> IndicatorResult {
    weighted_signal_with(analysis, weights, &CompositeThresholds::default())
}

pub fn weighted_signal_with(
    analysis: &CategoryAnalysis,
    weights: &CategoryWeights,
    thresholds: &CompositeThresholds,
) -> IndicatorResult {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;
    let mut composite = IndicatorResult::new(COMPOSITE_NAME, 0.0, Signal::Hold, 0.0);

    for (category, results) in analysis.iter() {
        let weight = weights.weight(category);
        for result in results {
            total_score += result.signal.score() * result.strength * weight;
            total_weight += weight;
        }
        composite = composite.with_meta(category.name(), results.len() as f64);
    }

    let score = if total_weight > 0.0 {
        (total_score / total_weight).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    composite.value = score;
    composite.signal = thresholds.classify(score);
    composite.strength = score.abs().min(1.0);
    composite.with_meta("indicators_used", analysis.indicator_count() as f64)
}
