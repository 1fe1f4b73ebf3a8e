//! Risk level scale and calibrated confidence values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Overall risk level on the four-step scale used across the pipeline.
///
/// Ordering follows severity, so `max()` over a set of levels yields the
/// most severe one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Crisis,
}

impl RiskLevel {
    /// Numeric risk code (LOW=1 .. CRISIS=4), the scale temporal history
    /// snapshots are stored on.
    pub fn code(self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
            RiskLevel::Crisis => 4,
        }
    }

    /// Maps a risk code back to a level. Codes above 4 saturate at Crisis;
    /// 0 maps to Low.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 | 1 => RiskLevel::Low,
            2 => RiskLevel::Medium,
            3 => RiskLevel::High,
            _ => RiskLevel::Crisis,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Crisis => "CRISIS",
        };
        write!(f, "{}", s)
    }
}

/// A confidence value, guaranteed to lie in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Creates a confidence value, rejecting anything outside [0, 1].
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&value) || value.is_nan() {
            return Err(ValidationError::out_of_range("confidence", 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Creates a confidence value, clamping into [0, 1]. NaN clamps to 0.
    ///
    /// Calibration multiplies independent factors and must never exceed 1.0,
    /// so the multiplication sites use this constructor.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the inner value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_orders_by_severity() {
        assert!(RiskLevel::Crisis > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    #[test]
    fn risk_level_code_round_trips() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Crisis,
        ] {
            assert_eq!(RiskLevel::from_code(level.code()), level);
        }
    }

    #[test]
    fn risk_level_from_code_saturates() {
        assert_eq!(RiskLevel::from_code(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_code(9), RiskLevel::Crisis);
    }

    #[test]
    fn risk_level_serializes_screaming_snake() {
        let json = serde_json::to_string(&RiskLevel::Crisis).unwrap();
        assert_eq!(json, "\"CRISIS\"");
    }

    #[test]
    fn confidence_rejects_out_of_range() {
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(1.1).is_err());
        assert!(Confidence::new(0.95).is_ok());
    }

    #[test]
    fn confidence_clamps() {
        assert_eq!(Confidence::clamped(1.3).value(), 1.0);
        assert_eq!(Confidence::clamped(-0.2).value(), 0.0);
        assert_eq!(Confidence::clamped(f64::NAN).value(), 0.0);
    }
}
