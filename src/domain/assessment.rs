//! Validated assessment instruments and tier routing.
//!
//! Validated scores are the only path to a non-estimate severity; everything
//! inferred from conversation is flagged as an estimate by the risk
//! calculator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated instruments the system can administer or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentKind {
    Phq2,
    Phq9,
    Gad2,
    Gad7,
    #[serde(rename = "C_SSRS")]
    Cssrs,
}

/// A completed assessment on record for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub kind: AssessmentKind,
    pub score: u8,
    pub administered_at: DateTime<Utc>,
    #[serde(default)]
    pub trigger_reason: String,
}

/// Which monitoring tier a student is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentTier {
    /// Baseline building, no scoring.
    #[serde(rename = "TIER_1_PASSIVE")]
    Passive,
    /// Explicit screening instruments due.
    #[serde(rename = "TIER_2_CHECKPOINT")]
    Checkpoint,
    /// Concern-indicator flagging without scores.
    #[serde(rename = "TIER_3_CONTEXTUAL")]
    Contextual,
}

/// One step of a checkpoint assessment plan: a short screener that
/// escalates to the full instrument on a positive result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningStep {
    pub kind: AssessmentKind,
    pub reason: &'static str,
    pub if_positive_threshold: u8,
    pub then_administer: AssessmentKind,
}

/// Plan for a tier-2 checkpoint: PHQ-2 and GAD-2, each escalating to the
/// full instrument at a score of 3 or more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPlan {
    pub sequence: Vec<ScreeningStep>,
    pub message: &'static str,
}

impl CheckpointPlan {
    pub fn standard() -> Self {
        Self {
            sequence: vec![
                ScreeningStep {
                    kind: AssessmentKind::Phq2,
                    reason: "Initial depression screening",
                    if_positive_threshold: 3,
                    then_administer: AssessmentKind::Phq9,
                },
                ScreeningStep {
                    kind: AssessmentKind::Gad2,
                    reason: "Initial anxiety screening",
                    if_positive_threshold: 3,
                    then_administer: AssessmentKind::Gad7,
                },
            ],
            message: "I'd like to check in on how you've been feeling. This helps me support you better.",
        }
    }

    /// Whether a screener score warrants the full instrument.
    pub fn escalates(step: &ScreeningStep, score: u8) -> bool {
        score >= step.if_positive_threshold
    }
}

/// C-SSRS severity classes, ordered by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CssrsSeverity {
    None,
    Low,
    Moderate,
    High,
    Crisis,
}

/// Clinical routing for a scored C-SSRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CssrsAction {
    ImmediateCrisisProtocol,
    UrgentCounselorNotification,
    ContinueMonitoring,
}

/// Yes/no answers to the five C-SSRS screener questions, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssrsResponses {
    /// Wish to be dead.
    pub wish_dead: bool,
    /// Active thoughts of killing oneself.
    pub active_ideation: bool,
    /// Thinking about a method.
    pub method: bool,
    /// Some intention of acting.
    pub intent: bool,
    /// Worked out details or taken preparatory steps.
    pub plan_or_behavior: bool,
}

/// A scored C-SSRS screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssrsResult {
    /// 0 when every answer is no, otherwise the highest affirmed question.
    pub score: u8,
    pub severity: CssrsSeverity,
    pub responses: CssrsResponses,
}

/// The verbatim C-SSRS screener questions. Presented exactly as written,
/// never paraphrased into conversation.
pub const CSSRS_QUESTIONS: [&str; 5] = [
    "In the past month, have you wished you were dead or wished you could go to sleep and not wake up?",
    "In the past month, have you actually had any thoughts of killing yourself?",
    "In the past month, have you been thinking about how you might kill yourself?",
    "In the past month, have you had these thoughts and had some intention of acting on them?",
    "In the past month, have you started to work out or worked out the details of how to kill yourself? Have you done anything, started to do anything, or prepared to do anything to end your life?",
];

/// Scores a set of C-SSRS responses. The score is the highest affirmed
/// question number, so a later yes supersedes earlier ones.
pub fn score_cssrs(responses: CssrsResponses) -> CssrsResult {
    let mut score = 0;
    let mut severity = CssrsSeverity::None;

    if responses.wish_dead {
        score = 1;
        severity = CssrsSeverity::Low;
    }
    if responses.active_ideation {
        score = 2;
        severity = CssrsSeverity::Moderate;
    }
    if responses.method {
        score = 3;
        severity = CssrsSeverity::High;
    }
    if responses.intent {
        score = 4;
        severity = CssrsSeverity::High;
    }
    if responses.plan_or_behavior {
        score = 5;
        severity = CssrsSeverity::Crisis;
    }

    CssrsResult {
        score,
        severity,
        responses,
    }
}

/// Routes a C-SSRS score to a clinical action using the configured cutoffs
/// (defaults: 3 for crisis, 1 for urgent).
pub fn cssrs_clinical_action(score: u8, high_risk_score: u8, urgent_score: u8) -> CssrsAction {
    if score >= high_risk_score {
        CssrsAction::ImmediateCrisisProtocol
    } else if score >= urgent_score {
        CssrsAction::UrgentCounselorNotification
    } else {
        CssrsAction::ContinueMonitoring
    }
}
