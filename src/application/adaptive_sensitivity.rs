//! Adaptive threshold management with a phased feedback loop.
//!
//! Deployment moves through three phases keyed on accumulated counselor
//! feedback: cold start (conservative fixed thresholds), calibration, and
//! data-driven optimization. Adjustments are bounded multiplicative nudges
//! and every change is written to the calibration audit log.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MonitoringSettings;
use crate::ports::{
    AiAccuracy, FeedbackRecord, FeedbackSeverity, PersistenceError, StudentRepository,
    ThresholdCalibrationRecord,
};

/// Feedback counts that bound the deployment phases.
const CALIBRATION_FEEDBACK_COUNT: u64 = 100;
const OPTIMIZATION_FEEDBACK_COUNT: u64 = 500;

/// Deployment phase, determined by total feedback volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentPhase {
    ColdStart,
    Calibration,
    Optimization,
}

impl DeploymentPhase {
    pub fn for_feedback_count(count: u64) -> Self {
        if count < CALIBRATION_FEEDBACK_COUNT {
            DeploymentPhase::ColdStart
        } else if count < OPTIMIZATION_FEEDBACK_COUNT {
            DeploymentPhase::Calibration
        } else {
            DeploymentPhase::Optimization
        }
    }

    pub fn routing_policy(self) -> &'static str {
        match self {
            DeploymentPhase::ColdStart => "route_all_medium_plus_to_human",
            DeploymentPhase::Calibration => "route_uncertain_to_human",
            DeploymentPhase::Optimization => "data_driven_routing",
        }
    }

    /// Phase-fixed risk thresholds. Optimization has no fixed set; the
    /// adjusted thresholds apply instead.
    fn fixed_risk_thresholds(self) -> Option<(f64, f64, f64)> {
        match self {
            DeploymentPhase::ColdStart => Some((0.7, 0.4, 0.5)),
            DeploymentPhase::Calibration => Some((0.75, 0.45, 0.6)),
            DeploymentPhase::Optimization => None,
        }
    }
}

/// The full set of live thresholds, snapshotted atomically for readers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub phq9: f64,
    pub gad7: f64,
    pub confidence: f64,
    pub high_risk: f64,
    pub medium_risk: f64,
    pub minimum_confidence: f64,
}

impl ThresholdSet {
    pub fn from_settings(settings: &MonitoringSettings) -> Self {
        Self {
            phq9: f64::from(settings.initial_phq9_threshold),
            gad7: f64::from(settings.initial_gad7_threshold),
            confidence: settings.risk_confidence_threshold,
            high_risk: 0.7,
            medium_risk: 0.4,
            minimum_confidence: 0.5,
        }
    }
}

/// Precision/recall metrics derived from counselor feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total: u64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl PerformanceMetrics {
    pub fn from_feedback(feedback: &[FeedbackRecord]) -> Self {
        if feedback.is_empty() {
            return Self::default();
        }

        let severe = |s: FeedbackSeverity| {
            matches!(
                s,
                FeedbackSeverity::Moderate | FeedbackSeverity::Severe | FeedbackSeverity::Crisis
            )
        };
        let true_positives = feedback
            .iter()
            .filter(|f| f.was_appropriate && severe(f.actual_severity))
            .count() as u64;
        let false_positives = feedback
            .iter()
            .filter(|f| !f.was_appropriate || f.ai_accuracy == AiAccuracy::OverFlagged)
            .count() as u64;
        let false_negatives = feedback
            .iter()
            .filter(|f| {
                f.ai_accuracy == AiAccuracy::MissedContext
                    && matches!(
                        f.actual_severity,
                        FeedbackSeverity::Severe | FeedbackSeverity::Crisis
                    )
            })
            .count() as u64;

        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            total: feedback.len() as u64,
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1_score,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Phased threshold manager. Reads are lock-snapshot cheap; adjustments
/// take the write lock briefly and audit every change.
pub struct AdaptiveSensitivity {
    repository: Arc<dyn StudentRepository>,
    thresholds: RwLock<ThresholdSet>,
}

impl AdaptiveSensitivity {
    pub fn new(repository: Arc<dyn StudentRepository>, settings: &MonitoringSettings) -> Self {
        Self {
            repository,
            thresholds: RwLock::new(ThresholdSet::from_settings(settings)),
        }
    }

    /// Atomic snapshot of the current thresholds, with phase-fixed risk
    /// cutoffs overlaid during cold start and calibration.
    pub async fn current_thresholds(&self) -> Result<ThresholdSet, PersistenceError> {
        let phase = self.deployment_phase().await?;
        let mut set = *self.thresholds.read().expect("threshold lock poisoned");
        if let Some((high, medium, min_conf)) = phase.fixed_risk_thresholds() {
            set.high_risk = high;
            set.medium_risk = medium;
            set.minimum_confidence = min_conf;
        }
        Ok(set)
    }

    pub async fn deployment_phase(&self) -> Result<DeploymentPhase, PersistenceError> {
        let count = self.repository.count_feedback().await?;
        Ok(DeploymentPhase::for_feedback_count(count))
    }

    pub async fn routing_policy(&self) -> Result<&'static str, PersistenceError> {
        Ok(self.deployment_phase().await?.routing_policy())
    }

    /// Computes performance metrics over the last `days` of feedback.
    pub async fn performance_metrics(
        &self,
        days: i64,
    ) -> Result<PerformanceMetrics, PersistenceError> {
        let feedback = self.repository.get_feedback(days).await?;
        Ok(PerformanceMetrics::from_feedback(&feedback))
    }

    /// Records counselor feedback and, in the optimization phase, adjusts
    /// thresholds from the updated metrics.
    pub async fn record_feedback(
        &self,
        feedback: &FeedbackRecord,
    ) -> Result<(), PersistenceError> {
        self.repository.save_feedback(feedback).await?;
        if self.deployment_phase().await? == DeploymentPhase::Optimization {
            let metrics = self.performance_metrics(30).await?;
            self.adjust_thresholds(&metrics).await?;
        }
        Ok(())
    }

    /// Nudges thresholds from observed error rates. A high false-positive
    /// rate raises thresholds 10%; any false negatives lower them 5%.
    /// Sensitivity wins when both apply.
    pub async fn adjust_thresholds(
        &self,
        metrics: &PerformanceMetrics,
    ) -> Result<Vec<ThresholdCalibrationRecord>, PersistenceError> {
        let mut records = Vec::new();

        let too_many_false_positives =
            metrics.false_positives as f64 > metrics.true_positives as f64 * 0.5;
        let has_false_negatives = metrics.false_negatives > 0;
        if !too_many_false_positives && !has_false_negatives {
            return Ok(records);
        }

        {
            let mut set = self.thresholds.write().expect("threshold lock poisoned");
            let set = &mut *set;
            if too_many_false_positives {
                for (name, value) in [
                    ("PHQ9", &mut set.phq9),
                    ("GAD7", &mut set.gad7),
                    ("confidence", &mut set.confidence),
                ] {
                    let old = *value;
                    *value = old * 1.10;
                    records.push(ThresholdCalibrationRecord {
                        threshold_type: name.to_string(),
                        old_value: old,
                        new_value: *value,
                        reason: "High false positive rate".to_string(),
                        calibrated_at: Utc::now(),
                    });
                }
            }
            if has_false_negatives {
                for (name, value) in [
                    ("PHQ9", &mut set.phq9),
                    ("GAD7", &mut set.gad7),
                    ("confidence", &mut set.confidence),
                ] {
                    let old = *value;
                    *value = old * 0.95;
                    records.push(ThresholdCalibrationRecord {
                        threshold_type: name.to_string(),
                        old_value: old,
                        new_value: *value,
                        reason: "False negatives detected".to_string(),
                        calibrated_at: Utc::now(),
                    });
                }
            }
        }

        for record in &records {
            self.repository.save_calibration(record).await?;
            info!(
                threshold = %record.threshold_type,
                old = record.old_value,
                new = record.new_value,
                reason = %record.reason,
                "threshold adjusted"
            );
        }
        Ok(records)
    }
}
