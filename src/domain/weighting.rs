//! Normalization of externally supplied agent weight rows.

use std::collections::HashMap;

/// Clamps negative weights to zero and scales the rest to sum to 1.
///
/// An all-zero (or all-negative) mapping comes back as all zeros.
pub fn normalize_weights(weights: &HashMap<String, f64>) -> HashMap<String, f64> {
    let total: f64 = weights.values().map(|w| w.max(0.0)).sum();
    let total = if total > 0.0 { total } else { 1.0 };
    weights
        .iter()
        .map(|(name, w)| (name.clone(), w.max(0.0) / total))
        .collect()
}
