//! Inbound messages and the enriched context assembled around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::baseline::StudentBaseline;
use super::foundation::StudentId;
use super::risk::RiskProfile;

/// A message received from a monitored student. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub student_id: StudentId,
    pub text: String,
    /// Session the message belongs to, when the caller supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Creates a message stamped with the current time.
    pub fn new(student_id: StudentId, text: impl Into<String>) -> Self {
        Self {
            student_id,
            text: text.into(),
            session_id: None,
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attaches a session reference.
    pub fn with_session(mut self, session_id: u64) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Student,
    Assistant,
}

/// One stored turn of a student's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn student(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::Student,
            text: text.into(),
            timestamp,
        }
    }

    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            timestamp,
        }
    }
}

/// Engagement statistics computed by the surrounding application and read
/// here as metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralMetadata {
    /// Fractional drop in engagement over the last seven days (0.65 = 65%).
    #[serde(default)]
    pub engagement_drop_percentage: f64,
}

/// Profile facts about a student, as known to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub student_id: StudentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub session_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<StudentBaseline>,
}

impl StudentInfo {
    /// Empty record for a student the persistence collaborator has never
    /// seen. Context enrichment never fails on missing records.
    pub fn unknown(student_id: StudentId) -> Self {
        Self {
            student_id,
            name: String::new(),
            email: String::new(),
            session_count: 0,
            baseline: None,
        }
    }
}

/// Everything checkpoint 2 gathers for the downstream checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContext {
    pub student: StudentInfo,
    pub conversation_history: Vec<ConversationTurn>,
    pub behavioral: BehavioralMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_risk: Option<RiskProfile>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub message_metadata: HashMap<String, String>,
    /// Flags carried forward from checkpoint 1.
    #[serde(default)]
    pub safety_flags: Vec<String>,
    #[serde(default)]
    pub crisis_detected: bool,
}

impl MessageContext {
    /// Empty context for a student with no stored records.
    pub fn empty(student_id: StudentId) -> Self {
        Self {
            student: StudentInfo::unknown(student_id),
            conversation_history: Vec::new(),
            behavioral: BehavioralMetadata::default(),
            prior_risk: None,
            message_metadata: HashMap::new(),
            safety_flags: Vec::new(),
            crisis_detected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_evidence() {
        let ctx = MessageContext::empty(StudentId::new("stu-1").unwrap());
        assert!(ctx.conversation_history.is_empty());
        assert!(ctx.prior_risk.is_none());
        assert!(!ctx.crisis_detected);
        assert_eq!(ctx.student.session_count, 0);
    }

    #[test]
    fn message_builder_attaches_session() {
        let msg = InboundMessage::new(StudentId::new("stu-1").unwrap(), "hey").with_session(7);
        assert_eq!(msg.session_id, Some(7));
        assert_eq!(msg.text, "hey");
    }
}
