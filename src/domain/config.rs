//! Typed configuration loading and validation.
//!
//! Sections:
//! - `[signals]` category weights and `buy_threshold`
//! - `[agents]` optional agent weight row, replacing the `[signals]` weights
//! - `[optimizer]` solver settings
//! - `[portfolio]` portfolio header and `symbols` list
//! - `[asset.<SYMBOL>]` per-asset statistics
//! - `[correlation]` pairwise correlations as `A/B = value`
//! - `[scenario.<NAME>]` extra or overriding stress scenarios
//!
//! Absent optional keys take their defaults; present keys that do not parse
//! or fall out of range are errors.

use std::collections::HashMap;
use std::str::FromStr;

use super::composite::{CategoryWeights, CompositeThresholds};
use super::error::SignalfolioError;
use super::optimizer::OptimizerSettings;
use super::portfolio::{
    Asset, AssetClass, Portfolio, DEFAULT_REBALANCE_THRESHOLD, DEFAULT_RISK_FREE_RATE,
};
use super::stress::{default_scenarios, StressScenario};
use super::weighting::normalize_weights;
use crate::ports::config_port::ConfigPort;

const ASSET_PREFIX: &str = "asset.";
const SCENARIO_PREFIX: &str = "scenario.";

/// Runs every loader and reports the first problem.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SignalfolioError> {
    load_category_weights(config)?;
    load_thresholds(config)?;
    load_optimizer_settings(config)?;
    load_portfolio(config)?;
    load_scenarios(config)?;
    Ok(())
}

/// Category weights from the `[agents]` row when present, else from `[signals]`.
pub fn load_category_weights(config: &dyn ConfigPort) -> Result<CategoryWeights, SignalfolioError> {
    if config.has_section("agents") {
        let agents = load_agent_weights(config)?;
        if agents.values().sum::<f64>() <= 0.0 {
            return Err(SignalfolioError::config_invalid(
                "agents",
                "*",
                "agent weights must not all be zero",
            ));
        }
        return Ok(CategoryWeights::from_map(&agents));
    }

    let defaults = CategoryWeights::default();
    let weights = CategoryWeights {
        trend: non_negative(config, "signals", "trend", defaults.trend)?,
        momentum: non_negative(config, "signals", "momentum", defaults.momentum)?,
        volatility: non_negative(config, "signals", "volatility", defaults.volatility)?,
        volume: non_negative(config, "signals", "volume", defaults.volume)?,
    };
    if weights.trend + weights.momentum + weights.volatility + weights.volume <= 0.0 {
        return Err(SignalfolioError::config_invalid(
            "signals",
            "trend",
            "category weights must not all be zero",
        ));
    }
    Ok(weights)
}

/// The `[agents]` row normalized to sum to 1; negative weights count as 0.
/// Empty when the section is absent.
pub fn load_agent_weights(
    config: &dyn ConfigPort,
) -> Result<HashMap<String, f64>, SignalfolioError> {
    let mut raw = HashMap::new();
    for key in config.keys("agents") {
        let weight = required::<f64>(config, "agents", &key)?;
        if !weight.is_finite() {
            return Err(SignalfolioError::config_invalid("agents", &key, "weight must be finite"));
        }
        raw.insert(key, weight);
    }
    Ok(normalize_weights(&raw))
}

pub fn load_thresholds(config: &dyn ConfigPort) -> Result<CompositeThresholds, SignalfolioError> {
    let default = CompositeThresholds::default().buy;
    let threshold = optional::<f64>(config, "signals", "buy_threshold")?.unwrap_or(default);
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(SignalfolioError::config_invalid(
            "signals",
            "buy_threshold",
            "buy_threshold must be between 0 and 1",
        ));
    }
    Ok(CompositeThresholds::symmetric(threshold))
}

pub fn load_optimizer_settings(
    config: &dyn ConfigPort,
) -> Result<OptimizerSettings, SignalfolioError> {
    let defaults = OptimizerSettings::default();

    let default_correlation = optional::<f64>(config, "optimizer", "default_correlation")?
        .unwrap_or(defaults.default_correlation);
    if !(-1.0..=1.0).contains(&default_correlation) {
        return Err(SignalfolioError::config_invalid(
            "optimizer",
            "default_correlation",
            "default_correlation must be between -1 and 1",
        ));
    }

    let max_target_scale = positive(config, "optimizer", "max_target_scale", defaults.max_target_scale)?;
    let sharpe_floor = positive(config, "optimizer", "sharpe_floor", defaults.sharpe_floor)?;

    let risk_parity_iterations = optional::<usize>(config, "optimizer", "risk_parity_iterations")?
        .unwrap_or(defaults.risk_parity_iterations);
    if risk_parity_iterations < 1 {
        return Err(SignalfolioError::config_invalid(
            "optimizer",
            "risk_parity_iterations",
            "risk_parity_iterations must be at least 1",
        ));
    }

    Ok(OptimizerSettings {
        default_correlation,
        max_target_scale,
        sharpe_floor,
        risk_parity_iterations,
    })
}

pub fn load_portfolio(config: &dyn ConfigPort) -> Result<Portfolio, SignalfolioError> {
    let name = config
        .get_string("portfolio", "name")
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Portfolio".to_string());

    let total_value = required::<f64>(config, "portfolio", "total_value")?;
    if !(total_value > 0.0) {
        return Err(SignalfolioError::config_invalid(
            "portfolio",
            "total_value",
            "total_value must be positive",
        ));
    }

    let cash = non_negative(config, "portfolio", "cash", 0.0)?;

    let risk_free_rate =
        optional::<f64>(config, "portfolio", "risk_free_rate")?.unwrap_or(DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(SignalfolioError::config_invalid(
            "portfolio",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let rebalance_threshold = optional::<f64>(config, "portfolio", "rebalance_threshold")?
        .unwrap_or(DEFAULT_REBALANCE_THRESHOLD);
    if !(rebalance_threshold > 0.0 && rebalance_threshold < 1.0) {
        return Err(SignalfolioError::config_invalid(
            "portfolio",
            "rebalance_threshold",
            "rebalance_threshold must be between 0 and 1",
        ));
    }

    let symbols = load_symbols(config)?;

    let mut portfolio = Portfolio::new(name, total_value);
    portfolio.cash = cash;
    portfolio.risk_free_rate = risk_free_rate;
    portfolio.rebalance_threshold = rebalance_threshold;

    let equal_weight = 1.0 / symbols.len() as f64;
    for symbol in &symbols {
        portfolio.add_asset(load_asset(config, symbol, equal_weight)?)?;
    }

    for key in config.keys("correlation") {
        let (left, right) = key
            .split_once('/')
            .map(|(l, r)| (l.trim(), r.trim()))
            .filter(|(l, r)| !l.is_empty() && !r.is_empty())
            .ok_or_else(|| {
                SignalfolioError::config_invalid("correlation", &key, "expected key of the form A/B")
            })?;
        let value = required::<f64>(config, "correlation", &key)?;
        portfolio
            .set_correlation(left, right, value)
            .map_err(|e| SignalfolioError::config_invalid("correlation", &key, e.to_string()))?;
    }

    Ok(portfolio)
}

fn load_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, SignalfolioError> {
    let raw = config
        .get_string("portfolio", "symbols")
        .ok_or_else(|| SignalfolioError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "symbols".to_string(),
        })?;
    let symbols = split_list(&raw);
    if symbols.is_empty() {
        return Err(SignalfolioError::config_invalid(
            "portfolio",
            "symbols",
            "at least one symbol is required",
        ));
    }
    for (i, symbol) in symbols.iter().enumerate() {
        if symbols[..i].contains(symbol) {
            return Err(SignalfolioError::config_invalid(
                "portfolio",
                "symbols",
                format!("duplicate symbol {}", symbol),
            ));
        }
    }
    Ok(symbols)
}

fn load_asset(
    config: &dyn ConfigPort,
    symbol: &str,
    default_weight: f64,
) -> Result<Asset, SignalfolioError> {
    let section = format!("{}{}", ASSET_PREFIX, symbol);
    let section = section.as_str();

    let name = config
        .get_string(section, "name")
        .unwrap_or_else(|| symbol.to_string());
    let price = required::<f64>(config, section, "price")?;
    if price < 0.0 {
        return Err(SignalfolioError::config_invalid(section, "price", "price must be non-negative"));
    }
    let expected_return = required::<f64>(config, section, "expected_return")?;
    let volatility = required::<f64>(config, section, "volatility")?;
    if volatility < 0.0 {
        return Err(SignalfolioError::config_invalid(
            section,
            "volatility",
            "volatility must be non-negative",
        ));
    }
    let weight = non_negative(config, section, "weight", default_weight)?;
    let asset_class = match config.get_string(section, "class") {
        Some(raw) => raw
            .parse::<AssetClass>()
            .map_err(|reason| SignalfolioError::config_invalid(section, "class", reason))?,
        None => AssetClass::default(),
    };
    let tags = config
        .get_string(section, "tags")
        .map(|raw| split_list(&raw))
        .unwrap_or_default();

    Ok(Asset::new(symbol, name, price, expected_return, volatility)
        .with_weight(weight)
        .with_class(asset_class)
        .with_tags(tags))
}

/// Built-in scenarios plus `[scenario.<NAME>]` sections. A section named like
/// a built-in replaces it.
///
/// Keys: `equity_shock`, `bond_shock`, `global_shock`, `vol_multiplier`,
/// `symbol.<SYMBOL>`, `category.<TAG>`.
pub fn load_scenarios(config: &dyn ConfigPort) -> Result<Vec<StressScenario>, SignalfolioError> {
    let mut scenarios = default_scenarios();

    for section in config.sections() {
        let Some(name) = section.strip_prefix(SCENARIO_PREFIX) else {
            continue;
        };
        let scenario = load_scenario(config, &section, name)?;
        match scenarios.iter_mut().find(|s| s.name == scenario.name) {
            Some(existing) => *existing = scenario,
            None => scenarios.push(scenario),
        }
    }

    Ok(scenarios)
}

fn load_scenario(
    config: &dyn ConfigPort,
    section: &str,
    name: &str,
) -> Result<StressScenario, SignalfolioError> {
    let mut scenario = StressScenario::new(name);

    for key in config.keys(section) {
        if key == "vol_multiplier" {
            scenario.vol_multiplier = non_negative(config, section, &key, 1.0)?;
            continue;
        }

        let shock = required::<f64>(config, section, &key)?;
        if !(shock >= -1.0) {
            return Err(SignalfolioError::config_invalid(
                section,
                &key,
                "shock must be at least -1",
            ));
        }

        scenario = match key.as_str() {
            "equity_shock" => scenario.with_equity_shock(shock),
            "bond_shock" => scenario.with_bond_shock(shock),
            "global_shock" => scenario.with_global_shock(shock),
            other => {
                if let Some(symbol) = other.strip_prefix("symbol.") {
                    scenario.with_symbol_shock(symbol, shock)
                } else if let Some(category) = other.strip_prefix("category.") {
                    scenario.with_category_shock(category, shock)
                } else {
                    return Err(SignalfolioError::config_invalid(
                        section,
                        other,
                        "unknown scenario key",
                    ));
                }
            }
        };
    }

    Ok(scenario)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SignalfolioError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            SignalfolioError::config_invalid(section, key, format!("cannot parse '{}'", raw))
        }),
    }
}

fn required<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<T, SignalfolioError> {
    optional(config, section, key)?.ok_or_else(|| SignalfolioError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SignalfolioError> {
    let value = optional::<f64>(config, section, key)?.unwrap_or(default);
    if !(value.is_finite() && value >= 0.0) {
        return Err(SignalfolioError::config_invalid(
            section,
            key,
            format!("{} must be non-negative", key),
        ));
    }
    Ok(value)
}

fn positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SignalfolioError> {
    let value = optional::<f64>(config, section, key)?.unwrap_or(default);
    if !(value.is_finite() && value > 0.0) {
        return Err(SignalfolioError::config_invalid(
            section,
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(value)
}
