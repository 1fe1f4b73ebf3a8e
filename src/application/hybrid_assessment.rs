//! Tiered assessment routing and passive baseline tracking.
//!
//! Tier 1 builds a baseline without scoring. Tier 2 administers explicit
//! screeners on a schedule. Tier 3 flags concern indicators between
//! checkpoints. Conversation analysis never produces validated scores.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::MonitoringSettings;
use crate::domain::analysis::extract_emojis;
use crate::domain::assessment::{
    cssrs_clinical_action, score_cssrs, AssessmentKind, AssessmentRecord, AssessmentTier,
    CheckpointPlan, CssrsAction, CssrsResponses, CssrsResult,
};
use crate::domain::baseline::{MessageObservation, Mood, Sentiment, StudentBaseline};
use crate::domain::foundation::StudentId;
use crate::ports::{PersistenceError, StudentRepository, TextGenerator};

use super::prompts;

#[derive(Debug, Deserialize)]
struct BaselineAnalysis {
    #[serde(default)]
    sentiment: Option<Sentiment>,
    #[serde(default)]
    sentiment_score: f64,
    #[serde(default)]
    contains_humor: bool,
}

/// Routes students between assessment tiers and performs tier-1 passive
/// tracking.
pub struct HybridAssessment {
    generator: Arc<dyn TextGenerator>,
    repository: Arc<dyn StudentRepository>,
    passive_sessions: u32,
    checkpoint_interval: Duration,
    cssrs_high_risk_score: u8,
    cssrs_urgent_score: u8,
}

impl HybridAssessment {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        repository: Arc<dyn StudentRepository>,
        settings: &MonitoringSettings,
    ) -> Self {
        Self {
            generator,
            repository,
            passive_sessions: settings.passive_monitoring_sessions,
            checkpoint_interval: Duration::days(settings.checkpoint_interval_days),
            cssrs_high_risk_score: settings.cssrs_high_risk_score,
            cssrs_urgent_score: settings.cssrs_urgent_score,
        }
    }

    /// Tier for this student right now. The PHQ-2 screener on record marks
    /// the last completed checkpoint.
    pub async fn assessment_tier(
        &self,
        student_id: &StudentId,
    ) -> Result<AssessmentTier, PersistenceError> {
        let student = self.repository.ensure_student(student_id).await?;
        if student.session_count < self.passive_sessions {
            return Ok(AssessmentTier::Passive);
        }
        if self.checkpoint_due(student_id).await? {
            return Ok(AssessmentTier::Checkpoint);
        }
        Ok(AssessmentTier::Contextual)
    }

    async fn checkpoint_due(&self, student_id: &StudentId) -> Result<bool, PersistenceError> {
        let last = self
            .repository
            .get_latest_assessment(student_id, AssessmentKind::Phq2)
            .await?;
        Ok(match last {
            None => true,
            Some(record) => Utc::now() - record.administered_at >= self.checkpoint_interval,
        })
    }

    /// The screening sequence for a due checkpoint.
    pub fn checkpoint_plan(&self) -> CheckpointPlan {
        CheckpointPlan::standard()
    }

    /// Records a completed screener and returns the full instrument to
    /// administer next when the score escalates.
    pub async fn record_screening(
        &self,
        student_id: &StudentId,
        kind: AssessmentKind,
        score: u8,
        trigger_reason: &str,
    ) -> Result<Option<AssessmentKind>, PersistenceError> {
        self.repository
            .save_assessment(
                student_id,
                &AssessmentRecord {
                    kind,
                    score,
                    administered_at: Utc::now(),
                    trigger_reason: trigger_reason.to_string(),
                },
            )
            .await?;

        let escalation = CheckpointPlan::standard()
            .sequence
            .into_iter()
            .find(|step| step.kind == kind && CheckpointPlan::escalates(step, score))
            .map(|step| step.then_administer);
        if let Some(next) = escalation {
            info!(student_id = %student_id, ?kind, score, ?next, "screener escalated");
        }
        Ok(escalation)
    }

    /// Scores and records a C-SSRS screening, returning the result and the
    /// clinical action the configured cutoffs demand.
    pub async fn record_cssrs(
        &self,
        student_id: &StudentId,
        responses: CssrsResponses,
        trigger_reason: &str,
    ) -> Result<(CssrsResult, CssrsAction), PersistenceError> {
        let result = score_cssrs(responses);
        self.repository
            .save_assessment(
                student_id,
                &AssessmentRecord {
                    kind: AssessmentKind::Cssrs,
                    score: result.score,
                    administered_at: Utc::now(),
                    trigger_reason: trigger_reason.to_string(),
                },
            )
            .await?;

        let action =
            cssrs_clinical_action(result.score, self.cssrs_high_risk_score, self.cssrs_urgent_score);
        if action != CssrsAction::ContinueMonitoring {
            warn!(
                student_id = %student_id,
                score = result.score,
                severity = ?result.severity,
                ?action,
                "C-SSRS screening requires action"
            );
        }
        Ok((result, action))
    }

    /// Tier 1: folds one message into the student's baseline without any
    /// scoring. Sentiment and humor come from the model when available;
    /// analysis failure degrades to neutral.
    pub async fn track_passive(
        &self,
        student_id: &StudentId,
        message_text: &str,
    ) -> Result<(), PersistenceError> {
        let student = self.repository.ensure_student(student_id).await?;
        let analysis = self.analyze_for_baseline(message_text).await;

        let sentiment = analysis.sentiment.unwrap_or_default();
        let mood = match sentiment {
            Sentiment::Positive => Mood::Positive,
            Sentiment::Neutral => Mood::Neutral,
            Sentiment::Negative => Mood::Negative,
        };
        let emojis = extract_emojis(message_text);
        let observation = MessageObservation {
            message_length: message_text.chars().count(),
            emoji_count: emojis.len(),
            emojis,
            sentiment,
            sentiment_score: analysis.sentiment_score,
            contains_humor: analysis.contains_humor,
            mood,
        };

        let mut baseline = student.baseline.unwrap_or_default();
        baseline.observe_message(&observation);
        self.repository.update_baseline(student_id, &baseline).await?;

        info!(
            student_id = %student_id,
            samples = baseline.sample_count,
            "passive monitoring tracked"
        );
        Ok(())
    }

    /// Reads the student's baseline for deviation checks.
    pub async fn baseline(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<StudentBaseline>, PersistenceError> {
        Ok(self.repository.get_student(student_id).await?.and_then(|s| s.baseline))
    }

    async fn analyze_for_baseline(&self, message_text: &str) -> BaselineAnalysis {
        let neutral = BaselineAnalysis {
            sentiment: None,
            sentiment_score: 0.0,
            contains_humor: false,
        };
        let prompt = prompts::build_baseline_prompt(message_text);
        match self.generator.generate(&prompt, 200).await {
            Ok(response) => prompts::extract_json(&response)
                .and_then(|json| serde_json::from_str::<BaselineAnalysis>(json).ok())
                .unwrap_or(neutral),
            Err(err) => {
                warn!(error = %err, "baseline analysis failed");
                neutral
            }
        }
    }
}
