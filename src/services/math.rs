//! Shared arithmetic for the indicator formulas.

use crate::error::{EngineError, Result};

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `(current - reference) / reference * 100`, rounded.
pub fn percent_change(indicator: &'static str, current: f64, reference: f64) -> Result<f64> {
    if reference == 0.0 {
        return Err(EngineError::division_by_zero(
            indicator,
            "reference value is 0",
        ));
    }
    Ok(round2((current - reference) / reference * 100.0))
}

/// `part / whole * 100`, rounded.
pub fn percent_of(indicator: &'static str, part: f64, whole: f64, detail: &str) -> Result<f64> {
    if whole == 0.0 {
        return Err(EngineError::division_by_zero(indicator, detail));
    }
    Ok(round2(part / whole * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(-8.786610), -8.79);
        assert_eq!(round2(1.255230), 1.26);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change("od_delta", 125.0, 129.0).unwrap(), -3.1);
        assert_eq!(percent_change("od_delta", 88.0, 88.0).unwrap(), 0.0);
    }

    #[test]
    fn test_percent_change_zero_reference() {
        let err = percent_change("volume_delta", 10.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DivisionByZero {
                indicator: "volume_delta",
                ..
            }
        ));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of("thrust", 1.0, 3.0, "sum is 0").unwrap(), 33.33);
        assert!(percent_of("thrust", 1.0, 0.0, "sum is 0").is_err());
    }
}
