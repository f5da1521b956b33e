//! Portfolio optimization engine.
//!
//! Two allocation strategies share one pipeline: build [`SolverInputs`] from
//! the portfolio, let a [`WeightSolver`] pick weights, then derive the
//! statistics, recommendations and rebalance actions from those weights.
//! Portfolios with fewer than two assets get the basic result instead.

pub mod covariance;
pub mod metrics;
pub mod rebalance;
pub mod signals;
pub mod solver;

pub use covariance::{CovarianceMatrix, DEFAULT_CORRELATION};
pub use metrics::PortfolioMetrics;
pub use rebalance::{rebalance_actions, signal_based_rebalancing, RebalanceAction, TradeAction};
pub use solver::{MaxSharpe, RiskParity, SolverInputs, TargetReturn, WeightSolver};

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::composite::CategoryWeights;
use crate::domain::indicator::IndicatorResult;
use crate::domain::ohlcv::Interval;
use crate::domain::portfolio::Portfolio;
use crate::ports::data_port::DataPort;
use metrics::AllocationStats;

pub const MAX_DRAWDOWN_VOL_MULTIPLE: f64 = 2.5;
pub const MAX_DRAWDOWN_CAP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub portfolio_name: String,
    pub optimized_weights: HashMap<String, f64>,
    pub expected_return: f64,
    pub expected_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub diversification_ratio: f64,
    pub recommendations: Vec<String>,
    pub rebalance_actions: Vec<RebalanceAction>,
}

impl OptimizationResult {
    /// Current weights, zero statistics and a single explanatory message.
    ///
    /// Weights are rescaled to sum to 1 when their total is positive, so a
    /// lone asset configured at 0.5 reports 1.0. All-zero weights stay as they are.
    pub fn basic(portfolio: &Portfolio, message: &str) -> Self {
        let total: f64 = portfolio.assets().iter().map(|a| a.weight).sum();
        let scale = if total > 0.0 { total } else { 1.0 };
        OptimizationResult {
            portfolio_name: portfolio.name.clone(),
            optimized_weights: portfolio
                .assets()
                .iter()
                .map(|a| (a.symbol.clone(), a.weight / scale))
                .collect(),
            expected_return: 0.0,
            expected_volatility: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            diversification_ratio: 1.0,
            recommendations: vec![message.to_string()],
            rebalance_actions: Vec::new(),
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.optimized_weights.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    /// Correlation used for pairs the portfolio does not define.
    pub default_correlation: f64,
    /// Cap on the target-return scale factor.
    pub max_target_scale: f64,
    /// Smallest per-asset score in the max-Sharpe solver.
    pub sharpe_floor: f64,
    pub risk_parity_iterations: usize,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            default_correlation: DEFAULT_CORRELATION,
            max_target_scale: 2.0,
            sharpe_floor: 0.01,
            risk_parity_iterations: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioOptimizer {
    pub settings: OptimizerSettings,
    pub signal_weights: CategoryWeights,
}

impl PortfolioOptimizer {
    pub fn new(settings: OptimizerSettings) -> Self {
        PortfolioOptimizer {
            settings,
            signal_weights: CategoryWeights::default(),
        }
    }

    pub fn with_signal_weights(mut self, weights: CategoryWeights) -> Self {
        self.signal_weights = weights;
        self
    }

    /// Mean-variance allocation: max-Sharpe weighting, or equal weights scaled
    /// toward `target_return` when one is given.
    pub fn optimize_portfolio_mpt(
        &self,
        portfolio: &Portfolio,
        target_return: Option<f64>,
    ) -> OptimizationResult {
        if portfolio.len() < 2 {
            return OptimizationResult::basic(portfolio, "need at least 2 assets for optimization");
        }

        let inputs = SolverInputs::from_portfolio(portfolio, self.settings.default_correlation);
        let weights = match target_return {
            Some(target) => TargetReturn {
                target,
                max_scale: self.settings.max_target_scale,
            }
            .solve(&inputs),
            None => MaxSharpe {
                floor: self.settings.sharpe_floor,
            }
            .solve(&inputs),
        };

        let stats = AllocationStats::compute(&inputs, &weights);
        let optimized = weight_map(portfolio, &weights);
        info!(
            portfolio = %portfolio.name,
            expected_return = stats.expected_return,
            volatility = stats.volatility,
            sharpe = stats.sharpe_ratio,
            "mean-variance optimization complete"
        );

        OptimizationResult {
            portfolio_name: portfolio.name.clone(),
            expected_return: stats.expected_return,
            expected_volatility: stats.volatility,
            sharpe_ratio: stats.sharpe_ratio,
            max_drawdown: estimate_max_drawdown(stats.volatility),
            diversification_ratio: stats.diversification_ratio,
            recommendations: allocation_recommendations(portfolio, &weights),
            rebalance_actions: rebalance_actions(portfolio, &optimized),
            optimized_weights: optimized,
        }
    }

    /// Equal-risk-contribution allocation.
    pub fn optimize_risk_parity(&self, portfolio: &Portfolio) -> OptimizationResult {
        if portfolio.len() < 2 {
            return OptimizationResult::basic(portfolio, "need at least 2 assets for risk parity");
        }

        let inputs = SolverInputs::from_portfolio(portfolio, self.settings.default_correlation);
        let weights = RiskParity {
            iterations: self.settings.risk_parity_iterations,
        }
        .solve(&inputs);

        let stats = AllocationStats::compute(&inputs, &weights);
        let contributions = inputs.covariance.risk_contributions(&weights);
        let optimized = weight_map(portfolio, &weights);
        info!(
            portfolio = %portfolio.name,
            volatility = stats.volatility,
            spread = solver::contribution_spread(&contributions),
            "risk parity optimization complete"
        );

        OptimizationResult {
            portfolio_name: format!("{} (Risk Parity)", portfolio.name),
            expected_return: stats.expected_return,
            expected_volatility: stats.volatility,
            sharpe_ratio: stats.sharpe_ratio,
            max_drawdown: estimate_max_drawdown(stats.volatility),
            diversification_ratio: stats.diversification_ratio,
            recommendations: risk_parity_recommendations(&contributions),
            rebalance_actions: rebalance_actions(portfolio, &optimized),
            optimized_weights: optimized,
        }
    }

    pub fn signal_based_rebalancing(
        &self,
        portfolio: &Portfolio,
        signals: &HashMap<String, Vec<IndicatorResult>>,
    ) -> Vec<RebalanceAction> {
        signal_based_rebalancing(portfolio, signals)
    }

    /// `None` for a portfolio without assets.
    pub fn get_portfolio_metrics(&self, portfolio: &Portfolio) -> Option<PortfolioMetrics> {
        metrics::portfolio_metrics(portfolio, self.settings.default_correlation)
    }

    pub fn analyze_portfolio_signals(
        &self,
        portfolio: &mut Portfolio,
        data: &dyn DataPort,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HashMap<String, Vec<IndicatorResult>> {
        debug!(portfolio = %portfolio.name, %interval, %start, %end, "analyzing portfolio signals");
        signals::analyze_portfolio_signals(
            portfolio,
            data,
            interval,
            start,
            end,
            &self.signal_weights,
        )
    }
}

/// Heuristic drawdown estimate: 2.5x volatility, capped at 50%.
pub fn estimate_max_drawdown(volatility: f64) -> f64 {
    (volatility * MAX_DRAWDOWN_VOL_MULTIPLE).min(MAX_DRAWDOWN_CAP)
}

fn weight_map(portfolio: &Portfolio, weights: &[f64]) -> HashMap<String, f64> {
    portfolio
        .assets()
        .iter()
        .zip(weights)
        .map(|(a, w)| (a.symbol.clone(), *w))
        .collect()
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Highest and lowest allocation, highest expected return, lowest volatility.
/// Ties go to the asset listed first.
fn allocation_recommendations(portfolio: &Portfolio, weights: &[f64]) -> Vec<String> {
    let assets = portfolio.assets();
    let pick = |better: &dyn Fn(usize, usize) -> bool| {
        (1..assets.len()).fold(0, |best, i| if better(i, best) { i } else { best })
    };

    let highest = pick(&|i, best| weights[i] > weights[best]);
    let lowest = pick(&|i, best| weights[i] < weights[best]);
    let best_return = pick(&|i, best| assets[i].expected_return > assets[best].expected_return);
    let lowest_vol = pick(&|i, best| assets[i].volatility < assets[best].volatility);

    vec![
        format!(
            "Highest allocation: {} ({})",
            assets[highest].symbol,
            percent(weights[highest])
        ),
        format!(
            "Lowest allocation: {} ({})",
            assets[lowest].symbol,
            percent(weights[lowest])
        ),
        format!(
            "Highest expected return: {} ({})",
            assets[best_return].symbol,
            percent(assets[best_return].expected_return)
        ),
        format!(
            "Lowest volatility: {} ({})",
            assets[lowest_vol].symbol,
            percent(assets[lowest_vol].volatility)
        ),
    ]
}

fn risk_parity_recommendations(contributions: &[f64]) -> Vec<String> {
    let n = contributions.len().max(1) as f64;
    let mean = contributions.iter().sum::<f64>() / n;
    let max = contributions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = contributions.iter().copied().fold(f64::INFINITY, f64::min);
    vec![
        "Risk Parity achieved - each asset contributes equally to total risk".to_string(),
        format!("Average risk contribution: {}", percent(mean)),
        format!(
            "Risk contribution range: {} to {}",
            percent(min),
            percent(max)
        ),
    ]
}
