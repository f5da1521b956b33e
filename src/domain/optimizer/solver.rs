//! Weight solvers.
//!
//! Each solver turns expected returns and a covariance matrix into long-only
//! weights that sum to 1. They are heuristics, not quadratic-programming
//! solves; an exact solver can replace any of them behind [`WeightSolver`].

use tracing::{debug, warn};

use super::covariance::CovarianceMatrix;
use crate::domain::portfolio::Portfolio;

/// Per-asset statistics in portfolio asset order.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverInputs {
    pub expected_returns: Vec<f64>,
    pub volatilities: Vec<f64>,
    pub covariance: CovarianceMatrix,
    pub risk_free_rate: f64,
}

impl SolverInputs {
    pub fn from_portfolio(portfolio: &Portfolio, default_correlation: f64) -> Self {
        SolverInputs {
            expected_returns: portfolio.assets().iter().map(|a| a.expected_return).collect(),
            volatilities: portfolio.assets().iter().map(|a| a.volatility).collect(),
            covariance: CovarianceMatrix::from_portfolio(portfolio, default_correlation),
            risk_free_rate: portfolio.risk_free_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.expected_returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected_returns.is_empty()
    }
}

pub trait WeightSolver {
    fn name(&self) -> &'static str;

    /// Weights in input order, summing to 1.
    fn solve(&self, inputs: &SolverInputs) -> Vec<f64>;
}

/// Weights proportional to each asset's excess return per unit of volatility,
/// floored so no asset drops to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxSharpe {
    pub floor: f64,
}

impl Default for MaxSharpe {
    fn default() -> Self {
        MaxSharpe { floor: 0.01 }
    }
}

impl WeightSolver for MaxSharpe {
    fn name(&self) -> &'static str {
        "max_sharpe"
    }

    fn solve(&self, inputs: &SolverInputs) -> Vec<f64> {
        let n = inputs.len();
        if inputs
            .volatilities
            .iter()
            .any(|v| !(v.is_finite() && *v > 0.0))
        {
            warn!(assets = n, "non-positive volatility, falling back to equal weights");
            return equal_weights(n);
        }

        let scores: Vec<f64> = inputs
            .expected_returns
            .iter()
            .zip(&inputs.volatilities)
            .map(|(r, v)| ((r - inputs.risk_free_rate) / v).max(self.floor))
            .collect();
        normalize(&scores)
    }
}

/// Equal weights scaled toward a target return, the scale capped at
/// `max_scale`. The scale is uniform, so after normalization the weights stay
/// equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetReturn {
    pub target: f64,
    pub max_scale: f64,
}

impl WeightSolver for TargetReturn {
    fn name(&self) -> &'static str {
        "target_return"
    }

    fn solve(&self, inputs: &SolverInputs) -> Vec<f64> {
        let mut weights = equal_weights(inputs.len());
        let current: f64 = weights
            .iter()
            .zip(&inputs.expected_returns)
            .map(|(w, r)| w * r)
            .sum();
        if current > 0.0 {
            let scale = (self.target / current).min(self.max_scale);
            debug!(target = self.target, current, scale, "scaling toward target return");
            weights.iter_mut().for_each(|w| *w *= scale);
        }
        normalize(&weights)
    }
}

/// Iterative equal-risk-contribution heuristic.
///
/// Each step multiplies a weight by √(target share / current share) and
/// renormalizes. This departs from the plain `w × (1/n ÷ rc)` update on
/// purpose: for two uncorrelated assets the plain update maps
/// x to (1 - x) / (1 + 3x), whose slope at the fixed point is -1, so it
/// oscillates between two allocations forever. The square root halves that
/// slope and the iteration contracts. The iterate with the smallest spread between the
/// largest and smallest risk contribution is returned, which is never worse
/// than the equal-weight start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParity {
    pub iterations: usize,
}

impl Default for RiskParity {
    fn default() -> Self {
        RiskParity { iterations: 10 }
    }
}

impl WeightSolver for RiskParity {
    fn name(&self) -> &'static str {
        "risk_parity"
    }

    fn solve(&self, inputs: &SolverInputs) -> Vec<f64> {
        let n = inputs.len();
        let cov = &inputs.covariance;
        let target_share = 1.0 / n as f64;

        let mut weights = equal_weights(n);
        let mut best = weights.clone();
        let mut best_spread = contribution_spread(&cov.risk_contributions(&weights));

        for iteration in 0..self.iterations {
            let contributions = cov.risk_contributions(&weights);
            let vol: f64 = contributions.iter().sum();
            if vol <= 0.0 {
                debug!(iteration, "zero portfolio volatility, stopping");
                break;
            }

            let next: Vec<f64> = weights
                .iter()
                .zip(&contributions)
                .map(|(w, c)| {
                    let share = c / vol;
                    if share > 0.0 {
                        w * (target_share / share).sqrt()
                    } else {
                        warn!(iteration, contribution = c, "non-positive risk contribution, weight kept");
                        *w
                    }
                })
                .collect();
            weights = normalize(&next);

            let spread = contribution_spread(&cov.risk_contributions(&weights));
            if spread < best_spread {
                best_spread = spread;
                best = weights.clone();
            }
        }

        debug!(spread = best_spread, "risk parity finished");
        best
    }
}

/// max - min of the risk contributions.
pub fn contribution_spread(contributions: &[f64]) -> f64 {
    let max = contributions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = contributions.iter().copied().fold(f64::INFINITY, f64::min);
    if contributions.is_empty() {
        0.0
    } else {
        max - min
    }
}

pub(crate) fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Scales to sum to 1; equal weights when the sum is not positive.
pub(crate) fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        weights.iter().map(|w| w / total).collect()
    } else {
        equal_weights(weights.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimizer::covariance::DEFAULT_CORRELATION;
    use crate::domain::portfolio::Asset;
    use approx::assert_relative_eq;

    fn inputs(assets: &[(&str, f64, f64)]) -> SolverInputs {
        let assets = assets
            .iter()
            .map(|(s, r, v)| Asset::new(*s, *s, 100.0, *r, *v))
            .collect();
        let portfolio = Portfolio::equal_weighted("Solver", 100_000.0, assets).unwrap();
        SolverInputs::from_portfolio(&portfolio, DEFAULT_CORRELATION)
    }

    #[test]
    fn max_sharpe_prefers_better_ratio() {
        let inputs = inputs(&[("A", 0.12, 0.30), ("B", 0.08, 0.20)]);
        let w = MaxSharpe::default().solve(&inputs);
        // (0.075 / 0.3) : (0.035 / 0.2) = 0.25 : 0.175
        assert_relative_eq!(w[0], 0.25 / 0.425, epsilon = 1e-12);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn max_sharpe_floors_negative_excess() {
        let inputs = inputs(&[("A", 0.20, 0.20), ("B", 0.01, 0.20)]);
        let w = MaxSharpe::default().solve(&inputs);
        // B is floored at 0.01 against A's 0.775
        assert!(w[1] > 0.0);
        assert_relative_eq!(w[1], 0.01 / 0.785, epsilon = 1e-12);
    }

    #[test]
    fn max_sharpe_zero_volatility_falls_back() {
        let inputs = inputs(&[("A", 0.12, 0.0), ("B", 0.08, 0.20)]);
        assert_eq!(MaxSharpe::default().solve(&inputs), vec![0.5, 0.5]);
    }

    #[test]
    fn target_return_stays_equal() {
        let inputs = inputs(&[("A", 0.12, 0.30), ("B", 0.08, 0.20), ("C", 0.05, 0.1)]);
        let solver = TargetReturn {
            target: 0.5,
            max_scale: 2.0,
        };
        let w = solver.solve(&inputs);
        for weight in w {
            assert_relative_eq!(weight, 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn target_return_negative_mean() {
        let inputs = inputs(&[("A", -0.12, 0.30), ("B", -0.08, 0.20)]);
        let solver = TargetReturn {
            target: 0.1,
            max_scale: 2.0,
        };
        assert_eq!(solver.solve(&inputs), vec![0.5, 0.5]);
    }

    #[test]
    fn risk_parity_tilts_toward_low_volatility() {
        let inputs = inputs(&[("A", 0.12, 0.40), ("B", 0.08, 0.10)]);
        let w = RiskParity::default().solve(&inputs);
        assert!(w[1] > w[0]);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn risk_parity_reduces_spread() {
        let inputs = inputs(&[("A", 0.12, 0.40), ("B", 0.08, 0.10), ("C", 0.1, 0.25)]);
        let cov = &inputs.covariance;
        let before = contribution_spread(&cov.risk_contributions(&equal_weights(3)));
        let w = RiskParity::default().solve(&inputs);
        let after = contribution_spread(&cov.risk_contributions(&w));
        assert!(after < before);
    }

    #[test]
    fn risk_parity_equal_assets_stay_equal() {
        let inputs = inputs(&[("A", 0.1, 0.2), ("B", 0.1, 0.2)]);
        assert_eq!(RiskParity::default().solve(&inputs), vec![0.5, 0.5]);
    }

    #[test]
    fn risk_parity_zero_iterations_is_equal_weight() {
        let inputs = inputs(&[("A", 0.1, 0.4), ("B", 0.1, 0.1)]);
        assert_eq!(RiskParity { iterations: 0 }.solve(&inputs), vec![0.5, 0.5]);
    }

    #[test]
    fn normalize_handles_zero_total() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.5, 0.5]);
        assert_eq!(normalize(&[1.0, 3.0]), vec![0.25, 0.75]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn spread_of_contributions() {
        assert_eq!(contribution_spread(&[0.1, 0.4, 0.2]), 0.4 - 0.1);
        assert_eq!(contribution_spread(&[]), 0.0);
    }
}
