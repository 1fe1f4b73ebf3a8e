//! Individually assessed risk factors.
//!
//! Each factor is optional on a profile: absence means no evidence was
//! found, not zero risk.

use serde::{Deserialize, Serialize};

use super::Confidence;

/// Suicidal ideation assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuicidalIdeation {
    pub present: bool,
    pub confidence: Confidence,
    /// Whether the expression was judged literal rather than idiomatic,
    /// sarcastic, or gaming talk. None when the judgment was unavailable
    /// (keyword fallback path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_literal: Option<bool>,
    pub reason: String,
    /// Set on every degraded-analysis path; such factors must be queued
    /// for a counselor regardless of final risk level.
    #[serde(default)]
    pub requires_human_review: bool,
}

/// Depression severity assessment, expressed on the PHQ-9 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepressionSeverity {
    /// Score on the PHQ-9 scale. Only a validated assessment yields a real
    /// score; every other path sets `is_estimate`.
    pub estimated_phq9: u8,
    pub confidence: Confidence,
    pub reason: String,
    /// True when the score is inferred rather than from a validated
    /// instrument. Estimates are never presented as validated scores.
    #[serde(default)]
    pub is_estimate: bool,
    /// True when a validated assessment should be administered to confirm.
    #[serde(default)]
    pub requires_assessment: bool,
}

/// Concern grading for the behavior-change factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcernLevel {
    Low,
    Medium,
    High,
}

/// Behavior change assessment, derived from engagement metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorChange {
    pub concern: ConcernLevel,
    pub confidence: Confidence,
    pub reason: String,
}

/// The three independently assessed factors feeding one risk profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suicidal_ideation: Option<SuicidalIdeation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depression_severity: Option<DepressionSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior_change: Option<BehaviorChange>,
}

impl RiskFactors {
    /// Returns true when no factor carries any evidence.
    pub fn is_empty(&self) -> bool {
        self.suicidal_ideation.is_none()
            && self.depression_severity.is_none()
            && self.behavior_change.is_none()
    }

    /// Returns true when any factor is flagged for human review.
    pub fn requires_human_review(&self) -> bool {
        self.suicidal_ideation
            .as_ref()
            .is_some_and(|si| si.requires_human_review)
    }
}
