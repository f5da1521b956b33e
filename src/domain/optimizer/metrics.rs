//! Risk and return metrics of a portfolio at its current weights.

use serde::Serialize;

use super::solver::SolverInputs;
use crate::domain::portfolio::Portfolio;

/// One-sided 95% normal quantile.
pub const VAR_95_Z: f64 = 1.645;
/// Multiplier used for expected shortfall.
pub const EXPECTED_SHORTFALL_Z: f64 = 2.326;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub portfolio_return: f64,
    pub portfolio_volatility: f64,
    pub sharpe_ratio: f64,
    pub diversification_ratio: f64,
    pub max_risk_contribution: f64,
    pub min_risk_contribution: f64,
    /// Negative: a loss in currency units.
    pub value_at_risk_95: f64,
    pub expected_shortfall: f64,
    pub total_value: f64,
    pub cash_position: f64,
}

/// Return, volatility, Sharpe and diversification ratio of a weight vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AllocationStats {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub diversification_ratio: f64,
}

impl AllocationStats {
    /// Zero volatility gives a Sharpe ratio of 0 and a diversification ratio of 1.
    pub fn compute(inputs: &SolverInputs, weights: &[f64]) -> Self {
        let expected_return: f64 = weights
            .iter()
            .zip(&inputs.expected_returns)
            .map(|(w, r)| w * r)
            .sum();
        let volatility = inputs.covariance.volatility(weights);
        let weighted_vol: f64 = weights
            .iter()
            .zip(&inputs.volatilities)
            .map(|(w, v)| w * v)
            .sum();

        let (sharpe_ratio, diversification_ratio) = if volatility > 0.0 {
            (
                (expected_return - inputs.risk_free_rate) / volatility,
                weighted_vol / volatility,
            )
        } else {
            (0.0, 1.0)
        };

        AllocationStats {
            expected_return,
            volatility,
            sharpe_ratio,
            diversification_ratio,
        }
    }
}

pub(crate) fn portfolio_metrics(portfolio: &Portfolio, default_correlation: f64) -> Option<PortfolioMetrics> {
    if portfolio.is_empty() {
        return None;
    }

    let inputs = SolverInputs::from_portfolio(portfolio, default_correlation);
    let weights = portfolio.weights();
    let stats = AllocationStats::compute(&inputs, &weights);
    let contributions = inputs.covariance.risk_contributions(&weights);

    Some(PortfolioMetrics {
        portfolio_return: stats.expected_return,
        portfolio_volatility: stats.volatility,
        sharpe_ratio: stats.sharpe_ratio,
        diversification_ratio: stats.diversification_ratio,
        max_risk_contribution: contributions.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_risk_contribution: contributions.iter().copied().fold(f64::INFINITY, f64::min),
        value_at_risk_95: -VAR_95_Z * stats.volatility * portfolio.total_value,
        expected_shortfall: -EXPECTED_SHORTFALL_Z * stats.volatility * portfolio.total_value,
        total_value: portfolio.total_value,
        cash_position: portfolio.cash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimizer::covariance::DEFAULT_CORRELATION;
    use crate::domain::portfolio::Asset;
    use approx::assert_relative_eq;

    fn two_asset() -> Portfolio {
        let mut p = Portfolio::equal_weighted(
            "Metrics",
            100_000.0,
            vec![
                Asset::new("A", "A", 10.0, 0.12, 0.30),
                Asset::new("B", "B", 10.0, 0.08, 0.20),
            ],
        )
        .unwrap();
        p.cash = 5_000.0;
        p
    }

    #[test]
    fn empty_portfolio_has_no_metrics() {
        assert!(portfolio_metrics(&Portfolio::new("E", 1.0), DEFAULT_CORRELATION).is_none());
    }

    #[test]
    fn two_asset_metrics() {
        let m = portfolio_metrics(&two_asset(), DEFAULT_CORRELATION).unwrap();
        let vol = 0.0475_f64.sqrt();
        assert_relative_eq!(m.portfolio_return, 0.10, epsilon = 1e-12);
        assert_relative_eq!(m.portfolio_volatility, vol, epsilon = 1e-12);
        assert_relative_eq!(m.sharpe_ratio, (0.10 - 0.045) / vol, epsilon = 1e-12);
        assert_relative_eq!(m.diversification_ratio, 0.25 / vol, epsilon = 1e-12);
        assert_relative_eq!(m.value_at_risk_95, -1.645 * vol * 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(m.expected_shortfall, -2.326 * vol * 100_000.0, epsilon = 1e-6);
        assert!(m.max_risk_contribution > m.min_risk_contribution);
        assert_eq!(m.cash_position, 5_000.0);
    }

    #[test]
    fn zero_volatility_guards() {
        let p = Portfolio::equal_weighted(
            "Cash",
            1_000.0,
            vec![
                Asset::new("C", "C", 1.0, 0.02, 0.0),
                Asset::new("D", "D", 1.0, 0.03, 0.0),
            ],
        )
        .unwrap();
        let m = portfolio_metrics(&p, DEFAULT_CORRELATION).unwrap();
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.diversification_ratio, 1.0);
        assert_eq!(m.value_at_risk_95, 0.0);
    }
}
