//! Risk profiles and the deterministic decision tables derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StudentId;

use super::{Confidence, RiskFactors, RiskLevel};

/// Temporal trajectory patterns detected over a student's risk history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalPattern {
    RapidDeterioration,
    /// Sudden calm after sustained high distress. The most dangerous
    /// pattern: clinically associated with elevated near-term risk.
    PreDecisionCalm,
    ChronicElevated,
    Cyclical,
    Disengagement,
}

impl fmt::Display for TemporalPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemporalPattern::RapidDeterioration => "rapid_deterioration",
            TemporalPattern::PreDecisionCalm => "pre_decision_calm",
            TemporalPattern::ChronicElevated => "chronic_elevated",
            TemporalPattern::Cyclical => "cyclical",
            TemporalPattern::Disengagement => "disengagement",
        };
        write!(f, "{}", s)
    }
}

/// Action recommended for a computed risk profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    ImmediateCrisisProtocol,
    ImmediateAlert,
    HumanReviewQueue,
    ScheduleCounselorReviewWithin48h,
    ContinueMonitoring,
}

impl RecommendedAction {
    /// Deterministic action table over risk level and confidence.
    pub fn for_risk(overall_risk: RiskLevel, confidence: Confidence) -> Self {
        match overall_risk {
            RiskLevel::Crisis => RecommendedAction::ImmediateCrisisProtocol,
            RiskLevel::High if confidence.value() > 0.9 => RecommendedAction::ImmediateAlert,
            RiskLevel::High => RecommendedAction::HumanReviewQueue,
            RiskLevel::Medium => RecommendedAction::ScheduleCounselorReviewWithin48h,
            RiskLevel::Low => RecommendedAction::ContinueMonitoring,
        }
    }
}

/// A multi-factor risk assessment for one processed message.
///
/// Profiles are immutable once created; corrections arrive as new profiles,
/// and the append-only sequence forms the time series the temporal analyzer
/// reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub student_id: StudentId,
    pub overall_risk: RiskLevel,
    pub confidence: Confidence,
    pub risk_factors: RiskFactors,
    pub recommended_action: RecommendedAction,
    pub temporal_patterns: Vec<TemporalPattern>,
    pub calculated_at: DateTime<Utc>,
}

/// Alert routing classes, in descending urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Immediate,
    Urgent,
    Routine,
    None,
}

/// Alert routing recommendation derived from a risk profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecommendation {
    pub should_alert: bool,
    pub alert_type: AlertType,
    pub confidence: Confidence,
    pub reasoning: String,
    pub priority_score: f64,
}

impl AlertRecommendation {
    /// Derives the alert routing recommendation for a profile.
    ///
    /// HIGH-risk profiles with confidence at or below 0.9 route URGENT so a
    /// human reviews them; the response gating table is unaffected.
    pub fn for_profile(profile: &RiskProfile) -> Self {
        let confidence = profile.confidence;
        match profile.overall_risk {
            RiskLevel::Crisis => Self {
                should_alert: true,
                alert_type: AlertType::Immediate,
                confidence,
                reasoning: "Crisis-level risk detected".to_string(),
                priority_score: 100.0,
            },
            RiskLevel::High if confidence.value() > 0.9 => Self {
                should_alert: true,
                alert_type: AlertType::Immediate,
                confidence,
                reasoning: "High risk with high confidence".to_string(),
                priority_score: 90.0,
            },
            RiskLevel::High => Self {
                should_alert: true,
                alert_type: AlertType::Urgent,
                confidence,
                reasoning: "High risk below alert confidence - requires human review".to_string(),
                priority_score: 70.0,
            },
            RiskLevel::Medium => Self {
                should_alert: true,
                alert_type: AlertType::Routine,
                confidence,
                reasoning: "Medium risk - routine review recommended".to_string(),
                priority_score: 50.0,
            },
            RiskLevel::Low => Self {
                should_alert: false,
                alert_type: AlertType::None,
                confidence,
                reasoning: String::new(),
                priority_score: f64::from(profile.overall_risk.code()) * confidence.value() * 25.0,
            },
        }
    }
}
