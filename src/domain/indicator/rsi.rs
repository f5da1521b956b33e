//! RSI (Relative Strength Index).
//!
//! For each window of n price changes:
//! avg_gain = sum(gains)/n, avg_loss = sum(losses)/n
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); RSI = 100 when avg_loss == 0.
//!
//! Needs n + 1 prices. Output length: len - n.

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return Vec::new();
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    changes
        .windows(period)
        .map(|window| {
            let gain: f64 = window.iter().filter(|&&c| c > 0.0).sum();
            let loss: f64 = window.iter().filter(|&&c| c < 0.0).map(|c| -c).sum();
            let avg_gain = gain / period as f64;
            let avg_loss = loss / period as f64;
            if avg_loss == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
            }
        })
        .collect()
}
