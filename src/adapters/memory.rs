//! In-memory implementation of the student repository port.
//!
//! Thread-safe via internal `Mutex`. Suitable for tests, demos, and
//! single-process deployments; nothing survives a restart. Production
//! deployments back this port with a database instead.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::assessment::{AssessmentKind, AssessmentRecord};
use crate::domain::baseline::StudentBaseline;
use crate::domain::checkpoint::MessageAnalysis;
use crate::domain::foundation::StudentId;
use crate::domain::message::{ConversationTurn, StudentInfo};
use crate::domain::risk::RiskProfile;
use crate::ports::{
    AlertRecord, AlertStatus, FeedbackRecord, PersistenceError, StudentRepository,
    ThresholdCalibrationRecord,
};

#[derive(Default)]
struct StudentState {
    info: Option<StudentInfo>,
    risk_history: Vec<RiskProfile>,
    assessments: Vec<AssessmentRecord>,
    conversation: Vec<ConversationTurn>,
}

/// In-memory student repository.
#[derive(Default)]
pub struct InMemoryRepository {
    students: Mutex<HashMap<String, StudentState>>,
    alerts: Mutex<Vec<AlertRecord>>,
    analyses: Mutex<Vec<MessageAnalysis>>,
    feedback: Mutex<Vec<FeedbackRecord>>,
    calibrations: Mutex<Vec<ThresholdCalibrationRecord>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total alerts stored, for test verification.
    pub async fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    /// Stored analyses, for test verification.
    pub fn analyses(&self) -> Vec<MessageAnalysis> {
        self.analyses.lock().unwrap().clone()
    }

    /// Threshold calibration audit records, oldest first.
    pub fn calibrations(&self) -> Vec<ThresholdCalibrationRecord> {
        self.calibrations.lock().unwrap().clone()
    }

    fn with_student<R>(
        &self,
        student_id: &StudentId,
        f: impl FnOnce(&mut StudentState) -> R,
    ) -> R {
        let mut students = self.students.lock().unwrap();
        let state = students.entry(student_id.as_str().to_string()).or_default();
        f(state)
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn get_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<StudentInfo>, PersistenceError> {
        let students = self.students.lock().unwrap();
        Ok(students
            .get(student_id.as_str())
            .and_then(|state| state.info.clone()))
    }

    async fn ensure_student(
        &self,
        student_id: &StudentId,
    ) -> Result<StudentInfo, PersistenceError> {
        Ok(self.with_student(student_id, |state| {
            state
                .info
                .get_or_insert_with(|| StudentInfo::unknown(student_id.clone()))
                .clone()
        }))
    }

    async fn save_risk_profile(&self, profile: &RiskProfile) -> Result<(), PersistenceError> {
        self.with_student(&profile.student_id, |state| {
            state.risk_history.push(profile.clone());
        });
        Ok(())
    }

    async fn get_risk_history(
        &self,
        student_id: &StudentId,
        days: i64,
    ) -> Result<Vec<RiskProfile>, PersistenceError> {
        let cutoff = Utc::now() - Duration::days(days);
        Ok(self.with_student(student_id, |state| {
            let mut history: Vec<RiskProfile> = state
                .risk_history
                .iter()
                .filter(|p| p.calculated_at >= cutoff)
                .cloned()
                .collect();
            history.sort_by_key(|p| p.calculated_at);
            history
        }))
    }

    async fn get_latest_assessment(
        &self,
        student_id: &StudentId,
        kind: AssessmentKind,
    ) -> Result<Option<AssessmentRecord>, PersistenceError> {
        Ok(self.with_student(student_id, |state| {
            state
                .assessments
                .iter()
                .filter(|a| a.kind == kind)
                .max_by_key(|a| a.administered_at)
                .cloned()
        }))
    }

    async fn save_assessment(
        &self,
        student_id: &StudentId,
        record: &AssessmentRecord,
    ) -> Result<(), PersistenceError> {
        self.with_student(student_id, |state| {
            state.assessments.push(record.clone());
        });
        Ok(())
    }

    async fn append_conversation_turn(
        &self,
        student_id: &StudentId,
        turn: &ConversationTurn,
    ) -> Result<(), PersistenceError> {
        self.with_student(student_id, |state| {
            state.conversation.push(turn.clone());
        });
        Ok(())
    }

    async fn get_conversation_history(
        &self,
        student_id: &StudentId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, PersistenceError> {
        Ok(self.with_student(student_id, |state| {
            let skip = state.conversation.len().saturating_sub(limit);
            state.conversation[skip..].to_vec()
        }))
    }

    async fn update_baseline(
        &self,
        student_id: &StudentId,
        baseline: &StudentBaseline,
    ) -> Result<(), PersistenceError> {
        self.with_student(student_id, |state| {
            state
                .info
                .get_or_insert_with(|| StudentInfo::unknown(student_id.clone()))
                .baseline = Some(baseline.clone());
        });
        Ok(())
    }

    async fn increment_session_count(
        &self,
        student_id: &StudentId,
    ) -> Result<u32, PersistenceError> {
        Ok(self.with_student(student_id, |state| {
            let info = state
                .info
                .get_or_insert_with(|| StudentInfo::unknown(student_id.clone()));
            info.session_count += 1;
            info.session_count
        }))
    }

    async fn find_pending_alert(
        &self,
        student_id: &StudentId,
        message_text: &str,
    ) -> Result<Option<AlertRecord>, PersistenceError> {
        let alerts = self.alerts.lock().unwrap();
        Ok(alerts
            .iter()
            .find(|a| {
                a.status == AlertStatus::Pending
                    && a.student_id == *student_id
                    && a.message_text == message_text
            })
            .cloned())
    }

    async fn save_alert(&self, alert: &AlertRecord) -> Result<(), PersistenceError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    async fn save_analysis(&self, analysis: &MessageAnalysis) -> Result<(), PersistenceError> {
        self.analyses.lock().unwrap().push(analysis.clone());
        Ok(())
    }

    async fn save_feedback(&self, feedback: &FeedbackRecord) -> Result<(), PersistenceError> {
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(())
    }

    async fn get_feedback(&self, days: i64) -> Result<Vec<FeedbackRecord>, PersistenceError> {
        let cutoff = Utc::now() - Duration::days(days);
        let feedback = self.feedback.lock().unwrap();
        Ok(feedback
            .iter()
            .filter(|f| f.feedback_date >= cutoff)
            .cloned()
            .collect())
    }

    async fn count_feedback(&self) -> Result<u64, PersistenceError> {
        Ok(self.feedback.lock().unwrap().len() as u64)
    }

    async fn save_calibration(
        &self,
        record: &ThresholdCalibrationRecord,
    ) -> Result<(), PersistenceError> {
        self.calibrations.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::Speaker;
    use crate::domain::risk::{
        Confidence, RecommendedAction, RiskFactors, RiskLevel,
    };

    fn student() -> StudentId {
        StudentId::new("stu-mem").unwrap()
    }

    fn profile(days_ago: i64) -> RiskProfile {
        RiskProfile {
            student_id: student(),
            overall_risk: RiskLevel::Low,
            confidence: Confidence::clamped(0.5),
            risk_factors: RiskFactors::default(),
            recommended_action: RecommendedAction::ContinueMonitoring,
            temporal_patterns: Vec::new(),
            calculated_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[tokio::test]
    async fn ensure_student_creates_empty_record() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_student(&student()).await.unwrap().is_none());

        let info = repo.ensure_student(&student()).await.unwrap();
        assert_eq!(info.session_count, 0);
        assert!(repo.get_student(&student()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn risk_history_is_windowed_and_ordered() {
        let repo = InMemoryRepository::new();
        repo.save_risk_profile(&profile(45)).await.unwrap();
        repo.save_risk_profile(&profile(10)).await.unwrap();
        repo.save_risk_profile(&profile(2)).await.unwrap();

        let history = repo.get_risk_history(&student(), 30).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].calculated_at < history[1].calculated_at);
    }

    #[tokio::test]
    async fn conversation_history_returns_most_recent_oldest_first() {
        let repo = InMemoryRepository::new();
        for i in 0..5 {
            repo.append_conversation_turn(
                &student(),
                &ConversationTurn::student(format!("msg {i}"), Utc::now()),
            )
            .await
            .unwrap();
        }

        let history = repo.get_conversation_history(&student(), 3).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text, "msg 2");
        assert_eq!(history[2].text, "msg 4");
        assert_eq!(history[0].speaker, Speaker::Student);
    }

    #[tokio::test]
    async fn latest_assessment_wins_by_date() {
        let repo = InMemoryRepository::new();
        repo.save_assessment(
            &student(),
            &AssessmentRecord {
                kind: AssessmentKind::Phq9,
                score: 8,
                administered_at: Utc::now() - Duration::days(20),
                trigger_reason: "checkpoint".to_string(),
            },
        )
        .await
        .unwrap();
        repo.save_assessment(
            &student(),
            &AssessmentRecord {
                kind: AssessmentKind::Phq9,
                score: 14,
                administered_at: Utc::now() - Duration::days(1),
                trigger_reason: "escalation".to_string(),
            },
        )
        .await
        .unwrap();

        let latest = repo
            .get_latest_assessment(&student(), AssessmentKind::Phq9)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.score, 14);
        assert!(repo
            .get_latest_assessment(&student(), AssessmentKind::Gad7)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn session_count_increments() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.increment_session_count(&student()).await.unwrap(), 1);
        assert_eq!(repo.increment_session_count(&student()).await.unwrap(), 2);
        let info = repo.ensure_student(&student()).await.unwrap();
        assert_eq!(info.session_count, 2);
    }
}
