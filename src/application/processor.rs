//! Five-checkpoint sequential message processor.
//!
//! Checkpoints run strictly in order: safety screen, context enrichment,
//! reply generation, deep analysis, response gating. No reply leaves the
//! pipeline before the gating decision, and every checkpoint reached leaves
//! an audit record.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::analysis::ConcernIndicator;
use crate::domain::checkpoint::{
    CheckpointOutcome, CheckpointRecord, ContextSummary, DeepAnalysis, GatingOutcome,
    GenerationOutcome, MessageAnalysis,
};
use crate::domain::foundation::{AlertId, MessageId};
use crate::domain::message::{ConversationTurn, InboundMessage, MessageContext};
use crate::domain::risk::{AlertRecommendation, RiskLevel, RiskProfile};
use crate::domain::screening::SafetyScreener;
use crate::domain::temporal::TrajectoryAnalysis;
use crate::ports::{
    AlertRecord, AlertStatus, PersistenceError, StudentRepository, TextGenerator,
};

use super::concern_extractor::ConcernExtractor;
use super::emoji_interpreter::EmojiInterpreter;
use super::prompts;
use super::risk_calculator::RiskCalculator;
use super::temporal_analyzer::TemporalAnalyzer;

/// Crisis protocol message sent in place of any generated reply.
const CRISIS_PROTOCOL_MESSAGE: &str = "I'm concerned about your safety. Please reach out for immediate help:\n\n\
Crisis Text Line: Text HOME to 741741\n\
National Suicide Prevention Lifeline: 988\n\
Campus Counseling: [CAMPUS_NUMBER]\n\n\
I'm here to support you, and professional help is available right now.";

/// Appended to replies for medium-risk and unconfirmed high-risk cases.
const COUNSELING_NOTE: &str =
    "\n\nI'm here to support you. Would you like me to connect you with a counselor?";

/// Fallback reply when generation fails; the message still flows through
/// analysis and gating.
const FALLBACK_REPLY: &str = "I'm here with you. I'm having a little trouble responding right now, \
but what you're sharing matters and I'm listening.";

const HISTORY_LIMIT: usize = 10;

/// Errors that abort message processing entirely. Generation failures never
/// appear here; they degrade inside their checkpoint instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// The sequential checkpoint pipeline.
pub struct SequentialProcessor {
    generator: Arc<dyn TextGenerator>,
    repository: Arc<dyn StudentRepository>,
    screener: SafetyScreener,
    temporal: TemporalAnalyzer,
    risk_calculator: RiskCalculator,
    emoji_interpreter: EmojiInterpreter,
    concern_extractor: ConcernExtractor,
}

impl SequentialProcessor {
    pub fn new(generator: Arc<dyn TextGenerator>, repository: Arc<dyn StudentRepository>) -> Self {
        Self {
            screener: SafetyScreener::new(),
            temporal: TemporalAnalyzer::new(repository.clone()),
            risk_calculator: RiskCalculator::new(generator.clone(), repository.clone()),
            emoji_interpreter: EmojiInterpreter::new(generator.clone(), repository.clone()),
            concern_extractor: ConcernExtractor::new(generator.clone()),
            generator,
            repository,
        }
    }

    /// Processes one message through all checkpoints and persists the
    /// audit trail, conversation turns, and any alert.
    pub async fn process_message(
        &self,
        message: &InboundMessage,
    ) -> Result<MessageAnalysis, PipelineError> {
        let started = Instant::now();
        self.repository.ensure_student(&message.student_id).await?;
        let mut checkpoints = Vec::with_capacity(5);

        // Checkpoint 1: deterministic safety screen, no model calls.
        let screen_start = Instant::now();
        let report = self.screener.screen(&message.text);
        let crisis = report.crisis_detected;
        checkpoints.push(CheckpointRecord::new(
            CheckpointOutcome::ImmediateSafetyScreen(report.clone()),
            !crisis,
            elapsed_ms(screen_start),
        ));

        if crisis {
            warn!(
                student_id = %message.student_id,
                flags = ?report.flags,
                "crisis protocol triggered"
            );
            return self
                .crisis_branch(message, report.flags, checkpoints, started)
                .await;
        }

        // Checkpoint 2: context enrichment.
        let context = self
            .enrich_context(message, report.flags.clone(), false, &mut checkpoints)
            .await?;

        // Checkpoint 3: reply generation, buffered until gating.
        let llm_response = self.generate_reply(message, &context, &mut checkpoints).await;

        // Checkpoint 4: deep analysis.
        let deep_start = Instant::now();
        let trajectory = self.temporal.analyze(&message.student_id).await?;
        let emoji_verdict = self
            .emoji_interpreter
            .interpret(&message.student_id, &message.text, &context)
            .await;
        let concern_indicators = self
            .concern_extractor
            .extract(&message.text, &context, &emoji_verdict)
            .await;
        let (risk_profile, alert_rec) = self
            .risk_calculator
            .calculate_risk(
                &message.student_id,
                &message.text,
                &context,
                &concern_indicators,
                &trajectory,
            )
            .await?;
        checkpoints.push(CheckpointRecord::new(
            CheckpointOutcome::DeepAnalysis(Box::new(DeepAnalysis {
                emoji_analysis: emoji_verdict.clone(),
                concern_indicators: concern_indicators.clone(),
                risk_profile: risk_profile.clone(),
            })),
            true,
            elapsed_ms(deep_start),
        ));

        // Checkpoint 5: the gating decision is the only path to a reply.
        let gating = Self::gate_response(llm_response.as_deref(), &risk_profile);
        let gate_record = CheckpointRecord::new(
            CheckpointOutcome::ResponseGating(gating.clone()),
            true,
            0,
        );
        checkpoints.push(gate_record);

        let analysis = MessageAnalysis {
            student_id: message.student_id.clone(),
            message_id: MessageId::new(),
            message_text: message.text.clone(),
            checkpoints,
            emoji_analysis: Some(emoji_verdict),
            concern_indicators,
            safety_flags: report.flags,
            risk_profile: Some(risk_profile.clone()),
            response_generated: gating.response_sent,
            response_text: gating.final_response.clone(),
            crisis_protocol_triggered: gating.crisis_triggered,
            processed_at: Utc::now(),
        };

        self.maybe_create_alert(message, &risk_profile, &alert_rec).await?;
        self.persist(message, &analysis).await?;
        info!(
            student_id = %message.student_id,
            overall_risk = %risk_profile.overall_risk,
            crisis = analysis.crisis_protocol_triggered,
            total_ms = elapsed_ms(started),
            "message processed"
        );
        Ok(analysis)
    }

    /// Crisis path: reply generation is skipped, but context enrichment and
    /// risk calculation still run so the record is complete. A risk
    /// calculation failure here never blocks the crisis reply.
    async fn crisis_branch(
        &self,
        message: &InboundMessage,
        safety_flags: Vec<String>,
        mut checkpoints: Vec<CheckpointRecord>,
        started: Instant,
    ) -> Result<MessageAnalysis, PipelineError> {
        let context = self
            .enrich_context(message, safety_flags.clone(), true, &mut checkpoints)
            .await?;

        let concern_indicators = vec![ConcernIndicator::CrisisDetected];
        let risk_profile = match self.calculate_crisis_risk(message, &context, &concern_indicators).await {
            Ok((profile, alert_rec)) => {
                self.maybe_create_alert(message, &profile, &alert_rec).await?;
                Some(profile)
            }
            Err(err) => {
                error!(
                    student_id = %message.student_id,
                    error = %err,
                    "risk calculation failed during crisis, continuing without profile"
                );
                None
            }
        };

        let analysis = MessageAnalysis {
            student_id: message.student_id.clone(),
            message_id: MessageId::new(),
            message_text: message.text.clone(),
            checkpoints,
            emoji_analysis: None,
            concern_indicators,
            safety_flags,
            risk_profile,
            response_generated: true,
            response_text: Some(CRISIS_PROTOCOL_MESSAGE.to_string()),
            crisis_protocol_triggered: true,
            processed_at: Utc::now(),
        };

        self.persist(message, &analysis).await?;
        info!(
            student_id = %message.student_id,
            total_ms = elapsed_ms(started),
            "crisis response sent"
        );
        Ok(analysis)
    }

    async fn calculate_crisis_risk(
        &self,
        message: &InboundMessage,
        context: &MessageContext,
        concern_indicators: &[ConcernIndicator],
    ) -> Result<(RiskProfile, AlertRecommendation), PersistenceError> {
        let trajectory = self
            .temporal
            .analyze(&message.student_id)
            .await
            .unwrap_or_else(|_| TrajectoryAnalysis::snapshot_only());
        self.risk_calculator
            .calculate_risk(
                &message.student_id,
                &message.text,
                context,
                concern_indicators,
                &trajectory,
            )
            .await
    }

    /// Checkpoint 2. Missing student records never fail enrichment; the
    /// context is simply emptier.
    async fn enrich_context(
        &self,
        message: &InboundMessage,
        safety_flags: Vec<String>,
        crisis_detected: bool,
        checkpoints: &mut Vec<CheckpointRecord>,
    ) -> Result<MessageContext, PipelineError> {
        let start = Instant::now();
        let student = self.repository.ensure_student(&message.student_id).await?;
        let conversation_history = self
            .repository
            .get_conversation_history(&message.student_id, HISTORY_LIMIT)
            .await?;
        let prior_risk = self
            .repository
            .get_risk_history(&message.student_id, 30)
            .await?
            .into_iter()
            .last();

        let mut context = MessageContext::empty(message.student_id.clone());
        context.student = student;
        context.conversation_history = conversation_history;
        context.prior_risk = prior_risk;
        context.message_metadata = message.metadata.clone();
        context.safety_flags = safety_flags;
        context.crisis_detected = crisis_detected;
        if let Some(drop) = message
            .metadata
            .get("engagement_drop_percentage")
            .and_then(|v| v.parse::<f64>().ok())
        {
            context.behavioral.engagement_drop_percentage = drop;
        }

        let summary = ContextSummary {
            history_turns: context.conversation_history.len(),
            session_count: context.student.session_count,
            has_baseline: context.student.baseline.is_some(),
            prior_risk: context.prior_risk.as_ref().map(|p| p.overall_risk),
            crisis_detected,
        };
        checkpoints.push(CheckpointRecord::new(
            CheckpointOutcome::ContextEnrichment(summary),
            true,
            elapsed_ms(start),
        ));
        Ok(context)
    }

    /// Checkpoint 3. The reply is buffered, never sent from here. Failures
    /// degrade to a canned fallback and mark the checkpoint failed.
    async fn generate_reply(
        &self,
        message: &InboundMessage,
        context: &MessageContext,
        checkpoints: &mut Vec<CheckpointRecord>,
    ) -> Option<String> {
        let start = Instant::now();
        let prompt = prompts::build_reply_prompt(&message.text, context);
        match self.generator.generate(&prompt, 2000).await {
            Ok(raw) => {
                let filtered = self.screener.filter_response(&raw);
                checkpoints.push(CheckpointRecord::new(
                    CheckpointOutcome::LlmGeneration(GenerationOutcome {
                        response: Some(filtered.clone()),
                        error: None,
                    }),
                    true,
                    elapsed_ms(start),
                ));
                Some(filtered)
            }
            Err(err) => {
                error!(
                    student_id = %message.student_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "reply generation failed, using fallback"
                );
                checkpoints.push(CheckpointRecord::new(
                    CheckpointOutcome::LlmGeneration(GenerationOutcome {
                        response: Some(FALLBACK_REPLY.to_string()),
                        error: Some(err.to_string()),
                    }),
                    false,
                    elapsed_ms(start),
                ));
                Some(FALLBACK_REPLY.to_string())
            }
        }
    }

    /// Checkpoint 5 decision table. Confirmed high risk gets the crisis
    /// protocol; unconfirmed high risk and medium risk get the buffered
    /// reply with a counseling note; low risk gets the reply as-is.
    fn gate_response(llm_response: Option<&str>, profile: &RiskProfile) -> GatingOutcome {
        let risk = profile.overall_risk;
        let confidence = profile.confidence.value();

        if risk == RiskLevel::Crisis || (risk == RiskLevel::High && confidence > 0.9) {
            GatingOutcome {
                final_response: Some(CRISIS_PROTOCOL_MESSAGE.to_string()),
                response_sent: true,
                crisis_triggered: true,
                gating_decision: risk,
            }
        } else if risk == RiskLevel::Medium || risk == RiskLevel::High {
            let reply = llm_response.unwrap_or_default();
            GatingOutcome {
                final_response: Some(format!("{reply}{COUNSELING_NOTE}")),
                response_sent: true,
                crisis_triggered: false,
                gating_decision: risk,
            }
        } else {
            GatingOutcome {
                final_response: llm_response.map(str::to_string),
                response_sent: true,
                crisis_triggered: false,
                gating_decision: risk,
            }
        }
    }

    /// Creates a counselor alert unless an unresolved one already covers
    /// this exact message.
    async fn maybe_create_alert(
        &self,
        message: &InboundMessage,
        profile: &RiskProfile,
        recommendation: &AlertRecommendation,
    ) -> Result<(), PersistenceError> {
        if !recommendation.should_alert {
            return Ok(());
        }
        if let Some(existing) = self
            .repository
            .find_pending_alert(&message.student_id, &message.text)
            .await?
        {
            info!(
                student_id = %message.student_id,
                alert_id = %existing.alert_id,
                "pending alert already covers this message"
            );
            return Ok(());
        }

        let alert = AlertRecord {
            alert_id: AlertId::new(),
            student_id: message.student_id.clone(),
            alert_type: recommendation.alert_type,
            message_text: message.text.clone(),
            reasoning: recommendation.reasoning.clone(),
            priority_score: recommendation.priority_score,
            status: AlertStatus::Pending,
            created_at: Utc::now(),
        };
        self.repository.save_alert(&alert).await?;
        info!(
            student_id = %message.student_id,
            alert_type = ?alert.alert_type,
            priority = alert.priority_score,
            overall_risk = %profile.overall_risk,
            "alert created"
        );
        Ok(())
    }

    /// Saves the audit record and appends both turns to the conversation.
    async fn persist(
        &self,
        message: &InboundMessage,
        analysis: &MessageAnalysis,
    ) -> Result<(), PersistenceError> {
        self.repository.save_analysis(analysis).await?;
        self.repository
            .append_conversation_turn(
                &message.student_id,
                &ConversationTurn::student(message.text.clone(), message.timestamp),
            )
            .await?;
        if let Some(reply) = &analysis.response_text {
            self.repository
                .append_conversation_turn(
                    &message.student_id,
                    &ConversationTurn::assistant(reply.clone(), Utc::now()),
                )
                .await?;
        }
        if message.session_id.is_none() {
            self.repository
                .increment_session_count(&message.student_id)
                .await?;
        }
        Ok(())
    }

    /// The crisis protocol text, for callers that surface it directly.
    pub fn crisis_protocol_message() -> &'static str {
        CRISIS_PROTOCOL_MESSAGE
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::adapters::mock_generator::MockGenerator;
    use crate::domain::foundation::StudentId;
    use crate::domain::risk::{Confidence, RecommendedAction, RiskFactors};

    fn student() -> StudentId {
        StudentId::new("stu-p").unwrap()
    }

    fn benign_json() -> String {
        r#"{
            "suicidal_ideation": {"present": false, "is_literal": false, "confidence": 0.2, "reasoning": "casual"},
            "depression_indicators": {"severity_estimate": "LOW", "confidence": 0.3, "indicators": [], "reasoning": "none"},
            "overall_context": {"tone": "neutral", "escalation": false, "concern_level": "LOW"}
        }"#
        .to_string()
    }

    fn concern_none_json() -> String {
        r#"{"language_shift_detected": false, "hopelessness_themes": false,
            "engagement_drop": false, "sudden_mood_change": false}"#
            .to_string()
    }

    fn emoji_none_json() -> String {
        r#"{"genuine_distress": false, "confidence": 0.5, "reasoning": "no emojis",
            "emoji_function": "ambiguous",
            "emoji_context": {"emojis_found": [], "text_emoji_alignment": "neutral"}}"#
            .to_string()
    }

    fn benign_generator() -> MockGenerator {
        // Consumed in pipeline order: reply, emoji, concern, then the two
        // contextual analyses inside risk calculation.
        MockGenerator::new()
            .with_response("That sounds stressful. I'm glad you told me.".to_string())
            .with_response(emoji_none_json())
            .with_response(concern_none_json())
            .with_response(benign_json())
            .with_response(benign_json())
    }

    #[tokio::test]
    async fn benign_message_flows_through_all_checkpoints() {
        let repo = Arc::new(InMemoryRepository::new());
        let processor = SequentialProcessor::new(Arc::new(benign_generator()), repo);
        let message = InboundMessage::new(student(), "exams are rough this week");

        let analysis = processor.process_message(&message).await.unwrap();

        assert_eq!(
            analysis.checkpoint_names(),
            vec![
                "IMMEDIATE_SAFETY_SCREEN",
                "CONTEXT_ENRICHMENT",
                "LLM_GENERATION",
                "DEEP_ANALYSIS",
                "RESPONSE_GATING"
            ]
        );
        assert!(!analysis.crisis_protocol_triggered);
        assert_eq!(
            analysis.response_text.as_deref(),
            Some("That sounds stressful. I'm glad you told me.")
        );
        let profile = analysis.risk_profile.unwrap();
        assert_eq!(profile.overall_risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn crisis_message_skips_generation_and_sends_protocol() {
        let repo = Arc::new(InMemoryRepository::new());
        // Only the risk-calculation contextual analyses may run; the crisis
        // fast path answers ideation from safety flags without the model.
        let generator = MockGenerator::new();
        let processor = SequentialProcessor::new(Arc::new(generator), repo.clone());
        let message = InboundMessage::new(student(), "I want to kill myself tonight");

        let analysis = processor.process_message(&message).await.unwrap();

        assert!(analysis.crisis_protocol_triggered);
        assert!(analysis.response_generated);
        assert!(analysis
            .response_text
            .as_deref()
            .unwrap()
            .contains("Crisis Text Line: Text HOME to 741741"));
        assert_eq!(
            analysis.checkpoint_names(),
            vec!["IMMEDIATE_SAFETY_SCREEN", "CONTEXT_ENRICHMENT"]
        );
        assert!(!analysis.checkpoints[0].passed);
        assert_eq!(analysis.concern_indicators, vec![ConcernIndicator::CrisisDetected]);

        // Risk still calculated and persisted on the crisis path.
        let profile = analysis.risk_profile.expect("profile computed in crisis");
        assert_eq!(profile.overall_risk, RiskLevel::Crisis);
        let history = repo.get_risk_history(&student(), 30).await.unwrap();
        assert_eq!(history.len(), 1);

        // Crisis alert created.
        let alert = repo
            .find_pending_alert(&student(), &message.text)
            .await
            .unwrap()
            .expect("alert exists");
        assert_eq!(alert.priority_score, 100.0);
    }

    #[tokio::test]
    async fn repeated_crisis_message_does_not_duplicate_alert() {
        let repo = Arc::new(InMemoryRepository::new());
        let processor = SequentialProcessor::new(Arc::new(MockGenerator::new()), repo.clone());
        let message = InboundMessage::new(student(), "this is my final message");

        processor.process_message(&message).await.unwrap();
        processor.process_message(&message).await.unwrap();

        assert_eq!(repo.alert_count().await, 1);
    }

    #[tokio::test]
    async fn generation_failure_still_produces_gated_reply() {
        let repo = Arc::new(InMemoryRepository::new());
        let processor =
            SequentialProcessor::new(Arc::new(MockGenerator::failing()), repo);
        let message = InboundMessage::new(student(), "feeling flat lately");

        let analysis = processor.process_message(&message).await.unwrap();

        let generation = &analysis.checkpoints[2];
        assert!(!generation.passed);
        assert!(analysis.response_generated);
        assert!(analysis.response_text.is_some());
    }

    #[test]
    fn gating_appends_counseling_note_for_medium_risk() {
        let profile = RiskProfile {
            student_id: student(),
            overall_risk: RiskLevel::Medium,
            confidence: Confidence::clamped(0.8),
            risk_factors: RiskFactors::default(),
            recommended_action: RecommendedAction::ScheduleCounselorReviewWithin48h,
            temporal_patterns: Vec::new(),
            calculated_at: Utc::now(),
        };
        let gating = SequentialProcessor::gate_response(Some("Hang in there."), &profile);
        assert!(gating.response_sent);
        assert!(!gating.crisis_triggered);
        assert_eq!(
            gating.final_response.as_deref(),
            Some("Hang in there.\n\nI'm here to support you. Would you like me to connect you with a counselor?")
        );
    }

    #[test]
    fn gating_discards_reply_for_confirmed_high_risk() {
        let profile = RiskProfile {
            student_id: student(),
            overall_risk: RiskLevel::High,
            confidence: Confidence::clamped(0.95),
            risk_factors: RiskFactors::default(),
            recommended_action: RecommendedAction::ImmediateAlert,
            temporal_patterns: Vec::new(),
            calculated_at: Utc::now(),
        };
        let gating = SequentialProcessor::gate_response(Some("Generated reply"), &profile);
        assert!(gating.crisis_triggered);
        assert_eq!(
            gating.final_response.as_deref(),
            Some(CRISIS_PROTOCOL_MESSAGE)
        );
    }

    #[test]
    fn gating_routes_unconfirmed_high_risk_to_counseling_note() {
        let profile = RiskProfile {
            student_id: student(),
            overall_risk: RiskLevel::High,
            confidence: Confidence::clamped(0.9),
            risk_factors: RiskFactors::default(),
            recommended_action: RecommendedAction::HumanReviewQueue,
            temporal_patterns: Vec::new(),
            calculated_at: Utc::now(),
        };
        let gating = SequentialProcessor::gate_response(Some("Reply"), &profile);
        assert!(!gating.crisis_triggered);
        assert!(gating.final_response.unwrap().ends_with("counselor?"));
    }

    #[tokio::test]
    async fn conversation_turns_are_persisted() {
        let repo = Arc::new(InMemoryRepository::new());
        let processor = SequentialProcessor::new(Arc::new(benign_generator()), repo.clone());
        let message = InboundMessage::new(student(), "hey, long week");

        processor.process_message(&message).await.unwrap();

        let history = repo.get_conversation_history(&student(), 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "hey, long week");
    }
}
