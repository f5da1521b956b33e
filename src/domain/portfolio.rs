//! Portfolio model: a named basket of assets with per-asset statistics and a
//! symmetric pairwise correlation map.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::SignalfolioError;
use super::optimizer::OptimizationResult;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.045;
pub const DEFAULT_REBALANCE_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    #[default]
    Equity,
    Bond,
    Other,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Equity => "equity",
            AssetClass::Bond => "bond",
            AssetClass::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equity" | "stock" => Ok(AssetClass::Equity),
            "bond" | "fixed_income" => Ok(AssetClass::Bond),
            "other" => Ok(AssetClass::Other),
            other => Err(format!("unknown asset class '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    /// Annualized.
    pub expected_return: f64,
    /// Annualized, never negative.
    pub volatility: f64,
    pub weight: f64,
    pub target_weight: f64,
    /// Composite signal score in [-1, 1].
    pub signal_strength: f64,
    pub last_updated: DateTime<Utc>,
    pub asset_class: AssetClass,
    /// Free-form categories (e.g. "tech", "growth") matched by stress scenarios.
    pub tags: Vec<String>,
}

impl Asset {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        current_price: f64,
        expected_return: f64,
        volatility: f64,
    ) -> Self {
        Asset {
            symbol: symbol.into(),
            name: name.into(),
            current_price,
            expected_return,
            volatility,
            weight: 0.0,
            target_weight: 0.0,
            signal_strength: 0.0,
            last_updated: Utc::now(),
            asset_class: AssetClass::default(),
            tags: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self.target_weight = weight;
        self
    }

    pub fn with_class(mut self, asset_class: AssetClass) -> Self {
        self.asset_class = asset_class;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn set_signal_strength(&mut self, strength: f64, at: DateTime<Utc>) {
        self.signal_strength = strength.clamp(-1.0, 1.0);
        self.last_updated = at;
    }

    fn validate(&self) -> Result<(), SignalfolioError> {
        let invalid = |reason: &str| SignalfolioError::InvalidAsset {
            symbol: self.symbol.clone(),
            reason: reason.to_string(),
        };
        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol must not be empty"));
        }
        if !(self.current_price.is_finite() && self.current_price >= 0.0) {
            return Err(invalid("price must be a non-negative number"));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(invalid("volatility must be a non-negative number"));
        }
        if !self.expected_return.is_finite() {
            return Err(invalid("expected return must be finite"));
        }
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(invalid("weight must be a non-negative number"));
        }
        Ok(())
    }
}

/// A named basket of assets. Owns its assets and its correlation map.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub name: String,
    pub total_value: f64,
    pub cash: f64,
    pub risk_free_rate: f64,
    /// Weight deviation above which a rebalance action is emitted.
    pub rebalance_threshold: f64,
    pub created_at: DateTime<Utc>,
    pub last_rebalanced: Option<DateTime<Utc>>,
    assets: Vec<Asset>,
    correlations: HashMap<(String, String), f64>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>, total_value: f64) -> Self {
        Portfolio {
            name: name.into(),
            total_value,
            cash: 0.0,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            rebalance_threshold: DEFAULT_REBALANCE_THRESHOLD,
            created_at: Utc::now(),
            last_rebalanced: None,
            assets: Vec::new(),
            correlations: HashMap::new(),
        }
    }

    /// Builds a portfolio from assets and gives each an equal weight.
    pub fn equal_weighted(
        name: impl Into<String>,
        total_value: f64,
        assets: Vec<Asset>,
    ) -> Result<Self, SignalfolioError> {
        let mut portfolio = Portfolio::new(name, total_value);
        for asset in assets {
            portfolio.add_asset(asset)?;
        }
        portfolio.set_equal_weights();
        Ok(portfolio)
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<(), SignalfolioError> {
        asset.validate()?;
        if self.asset(&asset.symbol).is_some() {
            return Err(SignalfolioError::InvalidAsset {
                symbol: asset.symbol,
                reason: "duplicate symbol".to_string(),
            });
        }
        self.assets.push(asset);
        Ok(())
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn asset(&self, symbol: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    pub fn asset_mut(&mut self, symbol: &str) -> Option<&mut Asset> {
        self.assets.iter_mut().find(|a| a.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.weight).collect()
    }

    pub fn set_equal_weights(&mut self) {
        if self.assets.is_empty() {
            return;
        }
        let weight = 1.0 / self.assets.len() as f64;
        for asset in &mut self.assets {
            asset.weight = weight;
            asset.target_weight = weight;
        }
    }

    /// Stores the correlation for both orderings of the pair.
    pub fn set_correlation(
        &mut self,
        left: &str,
        right: &str,
        value: f64,
    ) -> Result<(), SignalfolioError> {
        let known = self.asset(left).is_some() && self.asset(right).is_some();
        let in_range = value.is_finite() && (-1.0..=1.0).contains(&value);
        let diagonal_ok = left != right || value == 1.0;
        if !(known && in_range && diagonal_ok) {
            return Err(SignalfolioError::InvalidCorrelation {
                left: left.to_string(),
                right: right.to_string(),
                value,
            });
        }
        if left != right {
            self.correlations
                .insert((left.to_string(), right.to_string()), value);
            self.correlations
                .insert((right.to_string(), left.to_string()), value);
        }
        Ok(())
    }

    /// Correlation of a pair: 1.0 on the diagonal, `None` when never set.
    pub fn correlation(&self, left: &str, right: &str) -> Option<f64> {
        if left == right {
            return Some(1.0);
        }
        self.correlations
            .get(&(left.to_string(), right.to_string()))
            .copied()
    }

    /// Moves every asset to the optimized weight and records the rebalance time.
    /// Assets missing from the result keep their weight.
    pub fn apply_allocation(&mut self, result: &OptimizationResult, at: DateTime<Utc>) {
        for asset in &mut self.assets {
            if let Some(&weight) = result.optimized_weights.get(&asset.symbol) {
                asset.target_weight = weight;
                asset.weight = weight;
                asset.last_updated = at;
            }
        }
        self.last_rebalanced = Some(at);
    }
}
