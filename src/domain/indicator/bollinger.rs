//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation of the same window.
//! Default parameters: period=20, multiplier=2.0.

use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(prices: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = calculate_sma(prices, period);
    let stddev = calculate_stddev(prices, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, sd)| m + multiplier * sd)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, sd)| m - multiplier * sd)
        .collect();

    BollingerBands {
        middle,
        upper,
        lower,
    }
}
