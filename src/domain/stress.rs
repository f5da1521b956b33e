//! Stress testing: named shock scenarios applied to a portfolio.
//!
//! Each asset contributes `weight * total_value`. A scenario shocks that
//! contribution by a fraction chosen by the first matching rule:
//! symbol shock, then category (asset tag) shock, then asset-class shock,
//! then the global shock. Assets matching nothing are unshocked.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::error::SignalfolioError;
use super::portfolio::{Asset, AssetClass, Portfolio};

#[derive(Debug, Clone, PartialEq)]
pub struct StressScenario {
    pub name: String,
    pub symbol_shocks: HashMap<String, f64>,
    /// Checked in insertion order against asset tags.
    pub category_shocks: Vec<(String, f64)>,
    pub equity_shock: Option<f64>,
    pub bond_shock: Option<f64>,
    pub global_shock: Option<f64>,
    /// Applied to every asset's volatility.
    pub vol_multiplier: f64,
}

impl StressScenario {
    pub fn new(name: impl Into<String>) -> Self {
        StressScenario {
            name: name.into(),
            symbol_shocks: HashMap::new(),
            category_shocks: Vec::new(),
            equity_shock: None,
            bond_shock: None,
            global_shock: None,
            vol_multiplier: 1.0,
        }
    }

    pub fn with_symbol_shock(mut self, symbol: &str, shock: f64) -> Self {
        self.symbol_shocks.insert(symbol.to_string(), shock);
        self
    }

    pub fn with_category_shock(mut self, category: &str, shock: f64) -> Self {
        self.category_shocks.push((category.to_string(), shock));
        self
    }

    pub fn with_equity_shock(mut self, shock: f64) -> Self {
        self.equity_shock = Some(shock);
        self
    }

    pub fn with_bond_shock(mut self, shock: f64) -> Self {
        self.bond_shock = Some(shock);
        self
    }

    pub fn with_global_shock(mut self, shock: f64) -> Self {
        self.global_shock = Some(shock);
        self
    }

    pub fn with_vol_multiplier(mut self, multiplier: f64) -> Self {
        self.vol_multiplier = multiplier;
        self
    }

    /// Fractional value change for `asset`; 0 when no rule matches.
    pub fn shock_for(&self, asset: &Asset) -> f64 {
        if let Some(&shock) = self.symbol_shocks.get(&asset.symbol) {
            return shock;
        }
        if let Some((_, shock)) = self
            .category_shocks
            .iter()
            .find(|(category, _)| asset.has_tag(category))
        {
            return *shock;
        }
        let class_shock = match asset.asset_class {
            AssetClass::Equity => self.equity_shock,
            AssetClass::Bond => self.bond_shock,
            AssetClass::Other => None,
        };
        class_shock.or(self.global_shock).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressResult {
    pub stressed_value: f64,
    pub loss_amount: f64,
    /// Fraction of total value; negative for a gain.
    pub loss_percentage: f64,
    pub stressed_volatility: f64,
    pub survival_probability: f64,
}

/// The built-in scenarios, in a fixed order.
pub fn default_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario::new("market_crash")
            .with_equity_shock(-0.30)
            .with_bond_shock(-0.10)
            .with_vol_multiplier(2.0),
        StressScenario::new("tech_bubble_burst")
            .with_symbol_shock("AAPL", -0.40)
            .with_symbol_shock("MSFT", -0.35)
            .with_symbol_shock("GOOGL", -0.45)
            .with_symbol_shock("AMZN", -0.50)
            .with_symbol_shock("TSLA", -0.60)
            .with_symbol_shock("NVDA", -0.55)
            .with_category_shock("tech", -0.40),
        StressScenario::new("interest_rate_hike")
            .with_category_shock("growth", -0.15)
            .with_category_shock("value", 0.05)
            .with_bond_shock(-0.05),
        StressScenario::new("geopolitical_crisis")
            .with_global_shock(-0.20)
            .with_vol_multiplier(1.5),
        StressScenario::new("recovery_scenario")
            .with_equity_shock(0.25)
            .with_vol_multiplier(0.7),
    ]
}

pub fn apply_scenario(portfolio: &Portfolio, scenario: &StressScenario) -> StressResult {
    let total = portfolio.total_value;
    let mut stressed_value = total;
    let mut variance = 0.0;

    for asset in portfolio.assets() {
        let contribution = asset.weight * total;
        stressed_value += contribution * scenario.shock_for(asset);
        variance += (asset.volatility * scenario.vol_multiplier).powi(2);
    }

    let loss_amount = total - stressed_value;
    let loss_percentage = if total != 0.0 { loss_amount / total } else { 0.0 };

    debug!(scenario = %scenario.name, loss_amount, loss_percentage, "scenario applied");

    StressResult {
        stressed_value,
        loss_amount,
        loss_percentage,
        stressed_volatility: variance.sqrt(),
        survival_probability: (1.0 - loss_percentage.abs()).max(0.0),
    }
}

pub fn stress_test(
    portfolio: &Portfolio,
    scenarios: &[StressScenario],
) -> BTreeMap<String, StressResult> {
    scenarios
        .iter()
        .map(|s| (s.name.clone(), apply_scenario(portfolio, s)))
        .collect()
}

/// Runs the named scenarios from `available`, or all of them when `names` is empty.
pub fn stress_test_named(
    portfolio: &Portfolio,
    available: &[StressScenario],
    names: &[String],
) -> Result<BTreeMap<String, StressResult>, SignalfolioError> {
    if names.is_empty() {
        return Ok(stress_test(portfolio, available));
    }
    let selected = names
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|s| &s.name == name)
                .cloned()
                .ok_or_else(|| SignalfolioError::UnknownScenario { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stress_test(portfolio, &selected))
}
