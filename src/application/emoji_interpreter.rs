//! Contextual emoji interpretation with personal baselines.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::analysis::{extract_emojis, EmojiVerdict};
use crate::domain::baseline::StudentBaseline;
use crate::domain::foundation::StudentId;
use crate::domain::message::MessageContext;
use crate::ports::{PersistenceError, StudentRepository, TextGenerator};

use super::prompts;

/// Interprets emoji usage against the student's own baseline rather than
/// fixed emoji-to-emotion mappings.
pub struct EmojiInterpreter {
    generator: Arc<dyn TextGenerator>,
    repository: Arc<dyn StudentRepository>,
}

impl EmojiInterpreter {
    pub fn new(generator: Arc<dyn TextGenerator>, repository: Arc<dyn StudentRepository>) -> Self {
        Self {
            generator,
            repository,
        }
    }

    /// Interprets emoji usage in a message and folds the observation into
    /// the student's emoji baseline. Interpretation failures degrade to a
    /// conservative verdict; baseline updates are best-effort.
    pub async fn interpret(
        &self,
        student_id: &StudentId,
        message_text: &str,
        context: &MessageContext,
    ) -> EmojiVerdict {
        let prompt = prompts::build_emoji_prompt(message_text, context.student.baseline.as_ref());

        let verdict = match self.generator.generate(&prompt, 400).await {
            Ok(response) => prompts::extract_json(&response)
                .and_then(|json| serde_json::from_str::<EmojiVerdict>(json).ok())
                .unwrap_or_else(|| {
                    warn!(student_id = %student_id, "emoji interpretation response invalid");
                    EmojiVerdict::analysis_failed()
                }),
            Err(err) => {
                error!(student_id = %student_id, error = %err, "emoji interpretation failed");
                EmojiVerdict::analysis_failed()
            }
        };

        if let Err(err) = self.update_baseline(student_id, message_text, context, &verdict).await {
            warn!(student_id = %student_id, error = %err, "emoji baseline update failed");
        }

        verdict
    }

    async fn update_baseline(
        &self,
        student_id: &StudentId,
        message_text: &str,
        context: &MessageContext,
        verdict: &EmojiVerdict,
    ) -> Result<(), PersistenceError> {
        let mut baseline = context
            .student
            .baseline
            .clone()
            .unwrap_or_else(StudentBaseline::default);

        for emoji in extract_emojis(message_text) {
            *baseline.common_emojis.entry(emoji).or_insert(0) += 1;
        }
        baseline.observe_emoji_function(&verdict.emoji_function.to_string());

        self.repository.update_baseline(student_id, &baseline).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::adapters::mock_generator::MockGenerator;
    use crate::domain::analysis::EmojiFunction;

    fn student() -> StudentId {
        StudentId::new("stu-emoji").unwrap()
    }

    #[tokio::test]
    async fn parses_model_verdict() {
        let repo = Arc::new(InMemoryRepository::new());
        let generator = MockGenerator::new().with_response(
            r#"{
                "genuine_distress": true,
                "confidence": 0.8,
                "reasoning": "crying emoji with hopeless text",
                "emoji_function": "literal",
                "emoji_context": {
                    "emojis_found": ["😭"],
                    "text_emoji_alignment": "amplifies"
                }
            }"#
            .to_string(),
        );
        let interpreter = EmojiInterpreter::new(Arc::new(generator), repo);
        let context = MessageContext::empty(student());

        let verdict = interpreter
            .interpret(&student(), "can't do this anymore 😭", &context)
            .await;
        assert!(verdict.genuine_distress);
        assert_eq!(verdict.emoji_function, EmojiFunction::Literal);
    }

    #[tokio::test]
    async fn generation_failure_degrades_conservatively() {
        let repo = Arc::new(InMemoryRepository::new());
        let interpreter = EmojiInterpreter::new(Arc::new(MockGenerator::failing()), repo);
        let context = MessageContext::empty(student());

        let verdict = interpreter.interpret(&student(), "hey 😅", &context).await;
        assert!(!verdict.genuine_distress);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.reasoning, "Analysis failed");
    }

    #[tokio::test]
    async fn baseline_records_observed_emojis() {
        let repo = Arc::new(InMemoryRepository::new());
        let generator = MockGenerator::new().with_response(
            r#"{"genuine_distress": false, "confidence": 0.6, "reasoning": "joking",
                "emoji_function": "humor",
                "emoji_context": {"emojis_found": ["😂"], "text_emoji_alignment": "softens"}}"#
                .to_string(),
        );
        let interpreter = EmojiInterpreter::new(Arc::new(generator), repo.clone());
        let context = MessageContext::empty(student());

        interpreter.interpret(&student(), "lol 😂", &context).await;

        let info = repo.ensure_student(&student()).await.unwrap();
        let baseline = info.baseline.unwrap();
        assert_eq!(baseline.common_emojis.get("😂"), Some(&1));
        assert_eq!(baseline.typical_emoji_function(), Some("humor"));
    }
}
