//! Checkpoint audit records and the final per-message analysis.
//!
//! Every processed message carries an ordered record per checkpoint reached,
//! including skipped and degraded ones. The records are the audit trail the
//! processing log persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{ConcernIndicator, EmojiVerdict};
use super::foundation::{MessageId, StudentId};
use super::risk::{RiskLevel, RiskProfile};
use super::screening::ScreenReport;

/// Compact audit summary of the enriched context; the full context stays
/// in memory for the run and is not persisted per checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub history_turns: usize,
    pub session_count: u32,
    pub has_baseline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_risk: Option<RiskLevel>,
    #[serde(default)]
    pub crisis_detected: bool,
}

/// Reply generation result. `error` is set on the degraded path where a
/// fallback reply stands in for the model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full deep-analysis result: emoji interpretation, concern indicators, and
/// the computed risk profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepAnalysis {
    pub emoji_analysis: EmojiVerdict,
    pub concern_indicators: Vec<ConcernIndicator>,
    pub risk_profile: RiskProfile,
}

/// The gating decision applied to the buffered reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
    pub response_sent: bool,
    pub crisis_triggered: bool,
    pub gating_decision: RiskLevel,
}

/// Outcome of one checkpoint, with its typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "checkpoint", content = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointOutcome {
    ImmediateSafetyScreen(ScreenReport),
    ContextEnrichment(ContextSummary),
    LlmGeneration(GenerationOutcome),
    DeepAnalysis(Box<DeepAnalysis>),
    ResponseGating(GatingOutcome),
}

impl CheckpointOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            CheckpointOutcome::ImmediateSafetyScreen(_) => "IMMEDIATE_SAFETY_SCREEN",
            CheckpointOutcome::ContextEnrichment(_) => "CONTEXT_ENRICHMENT",
            CheckpointOutcome::LlmGeneration(_) => "LLM_GENERATION",
            CheckpointOutcome::DeepAnalysis(_) => "DEEP_ANALYSIS",
            CheckpointOutcome::ResponseGating(_) => "RESPONSE_GATING",
        }
    }
}

/// One entry of the per-message audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    #[serde(flatten)]
    pub outcome: CheckpointOutcome,
    pub passed: bool,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl CheckpointRecord {
    pub fn new(outcome: CheckpointOutcome, passed: bool, elapsed_ms: u64) -> Self {
        Self {
            outcome,
            passed,
            elapsed_ms,
            timestamp: Utc::now(),
        }
    }
}

/// The complete result of processing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub student_id: StudentId,
    pub message_id: MessageId,
    pub message_text: String,
    pub checkpoints: Vec<CheckpointRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji_analysis: Option<EmojiVerdict>,
    #[serde(default)]
    pub concern_indicators: Vec<ConcernIndicator>,
    #[serde(default)]
    pub safety_flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<RiskProfile>,
    pub response_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    pub crisis_protocol_triggered: bool,
    pub processed_at: DateTime<Utc>,
}

impl MessageAnalysis {
    /// Names of the checkpoints reached, in execution order.
    pub fn checkpoint_names(&self) -> Vec<&'static str> {
        self.checkpoints.iter().map(|c| c.outcome.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_names_are_stable() {
        let outcome = CheckpointOutcome::ImmediateSafetyScreen(ScreenReport::default());
        assert_eq!(outcome.name(), "IMMEDIATE_SAFETY_SCREEN");

        let outcome = CheckpointOutcome::ResponseGating(GatingOutcome {
            final_response: None,
            response_sent: false,
            crisis_triggered: false,
            gating_decision: RiskLevel::Low,
        });
        assert_eq!(outcome.name(), "RESPONSE_GATING");
    }

    #[test]
    fn record_serializes_with_checkpoint_tag() {
        let record = CheckpointRecord::new(
            CheckpointOutcome::ContextEnrichment(ContextSummary::default()),
            true,
            12,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["checkpoint"], "CONTEXT_ENRICHMENT");
        assert_eq!(json["passed"], true);
        assert_eq!(json["elapsed_ms"], 12);
    }
}
