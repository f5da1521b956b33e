//! Covariance matrix built from per-asset volatilities and pairwise correlations.
//!
//! cov(i, j) = corr(i, j) * vol(i) * vol(j); pairs without a stored
//! correlation use the configured default.

use crate::domain::portfolio::Portfolio;

pub const DEFAULT_CORRELATION: f64 = 0.5;

/// Dense symmetric n x n matrix, rows in portfolio asset order.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    values: Vec<Vec<f64>>,
}

impl CovarianceMatrix {
    pub fn from_portfolio(portfolio: &Portfolio, default_correlation: f64) -> Self {
        let assets = portfolio.assets();
        let values = assets
            .iter()
            .map(|a| {
                assets
                    .iter()
                    .map(|b| {
                        let corr = portfolio
                            .correlation(&a.symbol, &b.symbol)
                            .unwrap_or(default_correlation);
                        corr * a.volatility * b.volatility
                    })
                    .collect()
            })
            .collect();
        CovarianceMatrix { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Σw, the marginal risk vector.
    pub fn times(&self, weights: &[f64]) -> Vec<f64> {
        self.values
            .iter()
            .map(|row| row.iter().zip(weights).map(|(c, w)| c * w).sum())
            .collect()
    }

    /// wᵀΣw
    pub fn variance(&self, weights: &[f64]) -> f64 {
        self.times(weights)
            .iter()
            .zip(weights)
            .map(|(m, w)| m * w)
            .sum()
    }

    /// √(wᵀΣw); tiny negative variances from rounding count as 0.
    pub fn volatility(&self, weights: &[f64]) -> f64 {
        self.variance(weights).max(0.0).sqrt()
    }

    /// Per-asset risk contribution wᵢ(Σw)ᵢ / σ. All zero when σ is 0.
    /// The contributions sum to σ.
    pub fn risk_contributions(&self, weights: &[f64]) -> Vec<f64> {
        let vol = self.volatility(weights);
        if vol == 0.0 {
            return vec![0.0; weights.len()];
        }
        self.times(weights)
            .iter()
            .zip(weights)
            .map(|(m, w)| w * m / vol)
            .collect()
    }
}
