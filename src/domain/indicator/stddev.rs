//! Rolling standard deviation.
//!
//! Population standard deviation over n prices (divides by N, not N-1).
//! Output length: len - n + 1; empty when len < n.

pub fn calculate_stddev(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    prices.windows(period).map(population_stddev).collect()
}

pub(crate) fn population_stddev(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|p| {
            let diff = p - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}
