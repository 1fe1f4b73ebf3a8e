//! Monitoring and assessment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Tunable thresholds and schedules for the monitoring pipeline. These are
/// the starting values; the adaptive sensitivity loop adjusts the risk
/// thresholds from counselor feedback at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringSettings {
    /// Starting PHQ-9 score threshold for depression flagging.
    #[serde(default = "default_phq9_threshold")]
    pub initial_phq9_threshold: u16,

    /// Starting GAD-7 score threshold for anxiety flagging.
    #[serde(default = "default_gad7_threshold")]
    pub initial_gad7_threshold: u16,

    /// Minimum confidence for automated risk routing.
    #[serde(default = "default_confidence_threshold")]
    pub risk_confidence_threshold: f64,

    /// Sessions spent in passive baseline building before any screening.
    #[serde(default = "default_passive_sessions")]
    pub passive_monitoring_sessions: u32,

    /// Days between scheduled screening checkpoints.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval_days: i64,

    /// C-SSRS score at or above which the crisis protocol activates.
    #[serde(default = "default_cssrs_high_risk")]
    pub cssrs_high_risk_score: u8,

    /// C-SSRS score at or above which an urgent referral is made.
    #[serde(default = "default_cssrs_urgent")]
    pub cssrs_urgent_score: u8,
}

impl MonitoringSettings {
    /// Validate monitoring configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.risk_confidence_threshold) {
            return Err(ValidationError::InvalidConfidenceThreshold);
        }
        if self.checkpoint_interval_days < 1 {
            return Err(ValidationError::InvalidCheckpointInterval);
        }
        if self.cssrs_high_risk_score > 5
            || self.cssrs_urgent_score > 5
            || self.cssrs_urgent_score > self.cssrs_high_risk_score
        {
            return Err(ValidationError::InvalidCssrsThreshold);
        }
        Ok(())
    }
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            initial_phq9_threshold: default_phq9_threshold(),
            initial_gad7_threshold: default_gad7_threshold(),
            risk_confidence_threshold: default_confidence_threshold(),
            passive_monitoring_sessions: default_passive_sessions(),
            checkpoint_interval_days: default_checkpoint_interval(),
            cssrs_high_risk_score: default_cssrs_high_risk(),
            cssrs_urgent_score: default_cssrs_urgent(),
        }
    }
}

fn default_phq9_threshold() -> u16 {
    10
}

fn default_gad7_threshold() -> u16 {
    10
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_passive_sessions() -> u32 {
    3
}

fn default_checkpoint_interval() -> i64 {
    30
}

fn default_cssrs_high_risk() -> u8 {
    3
}

fn default_cssrs_urgent() -> u8 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = MonitoringSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.initial_phq9_threshold, 10);
        assert_eq!(settings.passive_monitoring_sessions, 3);
        assert_eq!(settings.checkpoint_interval_days, 30);
        assert_eq!(settings.cssrs_high_risk_score, 3);
    }

    #[test]
    fn confidence_threshold_bounds_checked() {
        let settings = MonitoringSettings {
            risk_confidence_threshold: 1.4,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::InvalidConfidenceThreshold)
        ));
    }

    #[test]
    fn cssrs_ordering_checked() {
        let settings = MonitoringSettings {
            cssrs_high_risk_score: 2,
            cssrs_urgent_score: 4,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::InvalidCssrsThreshold)
        ));
    }
}
