//! OBV (On-Balance Volume).

use crate::domain::error::{ensure_same_len, SignalfolioError};

/// Calculate On-Balance Volume.
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// Needs two bars; output has one value per bar.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Result<Vec<f64>, SignalfolioError> {
    ensure_same_len("OBV", closes.len(), &[volumes.len()])?;
    if closes.len() < 2 {
        return Ok(Vec::new());
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut obv = volumes[0];
    values.push(obv);

    for i in 1..closes.len() {
        if closes[i] > closes[i - 1] {
            obv += volumes[i];
        } else if closes[i] < closes[i - 1] {
            obv -= volumes[i];
        }
        values.push(obv);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_adds_volume_on_up_day() {
        let obv = calculate_obv(&[100.0, 105.0], &[1000.0, 500.0]).unwrap();
        assert!((obv[1] - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn obv_subtracts_volume_on_down_day() {
        let obv = calculate_obv(&[100.0, 95.0], &[1000.0, 300.0]).unwrap();
        assert!((obv[1] - 700.0).abs() < f64::EPSILON);
    }

    #[test]
    fn obv_unchanged_on_flat_day() {
        let obv = calculate_obv(&[100.0, 100.0], &[1000.0, 500.0]).unwrap();
        assert!((obv[1] - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn obv_one_value_per_bar() {
        let obv = calculate_obv(&[100.0, 105.0, 102.0], &[1000.0, 500.0, 200.0]).unwrap();
        assert_eq!(obv, vec![1000.0, 1500.0, 1300.0]);
    }

    #[test]
    fn obv_single_bar_is_empty() {
        assert!(calculate_obv(&[100.0], &[1000.0]).unwrap().is_empty());
    }

    #[test]
    fn obv_mismatched_lengths_fail() {
        assert!(calculate_obv(&[100.0, 101.0], &[1000.0]).is_err());
    }
}
