//! Port for student state persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::assessment::AssessmentRecord;
use crate::domain::baseline::StudentBaseline;
use crate::domain::checkpoint::MessageAnalysis;
use crate::domain::foundation::{AlertId, StudentId};
use crate::domain::message::{ConversationTurn, StudentInfo};
use crate::domain::risk::{AlertType, RiskProfile};

/// Persistence failures. Unlike generation failures these propagate: a
/// message must not be silently processed without its audit trail.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Lifecycle of a counselor alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Pending,
    Acknowledged,
    Resolved,
}

/// An alert queued for counselor attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub alert_id: AlertId,
    pub student_id: StudentId,
    pub alert_type: AlertType,
    pub message_text: String,
    pub reasoning: String,
    pub priority_score: f64,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

/// Counselor verdict on how the automated flagging performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiAccuracy {
    Accurate,
    OverFlagged,
    MissedContext,
}

/// Severity the counselor actually observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackSeverity {
    None,
    Mild,
    Moderate,
    Severe,
    Crisis,
}

/// One item of counselor feedback on a flagged case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback_id: Uuid,
    pub student_id: StudentId,
    pub was_appropriate: bool,
    pub actual_severity: FeedbackSeverity,
    pub ai_accuracy: AiAccuracy,
    #[serde(default)]
    pub notes: String,
    pub feedback_date: DateTime<Utc>,
}

/// Audit record of one threshold adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCalibrationRecord {
    pub threshold_type: String,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: String,
    pub calibrated_at: DateTime<Utc>,
}

/// Storage boundary for student records, histories, alerts, and the
/// learning loop.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Fetches a student's profile record, if one exists.
    async fn get_student(&self, student_id: &StudentId)
        -> Result<Option<StudentInfo>, PersistenceError>;

    /// Fetches the student record, creating an empty one when missing, and
    /// returns it.
    async fn ensure_student(&self, student_id: &StudentId)
        -> Result<StudentInfo, PersistenceError>;

    /// Appends a risk profile to the student's append-only history.
    async fn save_risk_profile(&self, profile: &RiskProfile) -> Result<(), PersistenceError>;

    /// Risk profiles for the student within the last `days`, oldest first.
    async fn get_risk_history(
        &self,
        student_id: &StudentId,
        days: i64,
    ) -> Result<Vec<RiskProfile>, PersistenceError>;

    /// Most recent validated assessment of the given kind, if any.
    async fn get_latest_assessment(
        &self,
        student_id: &StudentId,
        kind: crate::domain::assessment::AssessmentKind,
    ) -> Result<Option<AssessmentRecord>, PersistenceError>;

    /// Records a completed assessment.
    async fn save_assessment(
        &self,
        student_id: &StudentId,
        record: &AssessmentRecord,
    ) -> Result<(), PersistenceError>;

    /// Appends one turn to the student's conversation log.
    async fn append_conversation_turn(
        &self,
        student_id: &StudentId,
        turn: &ConversationTurn,
    ) -> Result<(), PersistenceError>;

    /// The most recent `limit` conversation turns, oldest first.
    async fn get_conversation_history(
        &self,
        student_id: &StudentId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, PersistenceError>;

    /// Replaces the student's stored baseline.
    async fn update_baseline(
        &self,
        student_id: &StudentId,
        baseline: &StudentBaseline,
    ) -> Result<(), PersistenceError>;

    /// Increments the student's session counter and returns the new count.
    async fn increment_session_count(
        &self,
        student_id: &StudentId,
    ) -> Result<u32, PersistenceError>;

    /// Looks for an unresolved alert already covering this exact message.
    async fn find_pending_alert(
        &self,
        student_id: &StudentId,
        message_text: &str,
    ) -> Result<Option<AlertRecord>, PersistenceError>;

    /// Stores a new alert.
    async fn save_alert(&self, alert: &AlertRecord) -> Result<(), PersistenceError>;

    /// Stores the full per-message analysis for audit.
    async fn save_analysis(&self, analysis: &MessageAnalysis) -> Result<(), PersistenceError>;

    /// Stores one item of counselor feedback.
    async fn save_feedback(&self, feedback: &FeedbackRecord) -> Result<(), PersistenceError>;

    /// Feedback recorded within the last `days`.
    async fn get_feedback(&self, days: i64) -> Result<Vec<FeedbackRecord>, PersistenceError>;

    /// Total count of feedback ever recorded; drives deployment phasing.
    async fn count_feedback(&self) -> Result<u64, PersistenceError>;

    /// Appends a threshold calibration audit record.
    async fn save_calibration(
        &self,
        record: &ThresholdCalibrationRecord,
    ) -> Result<(), PersistenceError>;
}
