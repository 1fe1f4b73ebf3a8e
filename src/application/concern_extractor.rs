//! Concern indicator extraction for the deep-analysis checkpoint.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::domain::analysis::{ConcernIndicator, EmojiVerdict};
use crate::domain::message::MessageContext;
use crate::ports::TextGenerator;

use super::prompts;

/// Hopelessness phrasings the heuristic fallback matches.
const HOPELESSNESS_KEYWORDS: &[&str] = &[
    "hopeless",
    "worthless",
    "no point",
    "no future",
    "nothing matters",
    "can't go on",
    "give up",
    "no reason to live",
];

#[derive(Debug, Deserialize)]
struct ConcernAnalysis {
    #[serde(default)]
    language_shift_detected: bool,
    #[serde(default)]
    hopelessness_themes: bool,
    #[serde(default)]
    engagement_drop: bool,
    #[serde(default)]
    sudden_mood_change: bool,
}

/// Extracts concern indicators by comparing the current message against the
/// student's recent history. Model-backed, with a keyword heuristic when
/// generation fails.
pub struct ConcernExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl ConcernExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn extract(
        &self,
        message_text: &str,
        context: &MessageContext,
        emoji_verdict: &EmojiVerdict,
    ) -> Vec<ConcernIndicator> {
        let mut indicators = Vec::new();

        if emoji_verdict.genuine_distress {
            indicators.push(ConcernIndicator::GenuineDistressEmoji);
        }

        let analyzed = self.analyze(message_text, context).await;
        match analyzed {
            Some(analysis) => {
                if analysis.language_shift_detected {
                    indicators.push(ConcernIndicator::SuddenLanguageShift);
                }
                if analysis.hopelessness_themes {
                    indicators.push(ConcernIndicator::HopelessnessThemes);
                }
                if analysis.engagement_drop {
                    indicators.push(ConcernIndicator::SignificantEngagementDrop);
                }
                if analysis.sudden_mood_change {
                    indicators.push(ConcernIndicator::SuddenMoodChange);
                }
            }
            None => {
                indicators.extend(Self::fallback_indicators(message_text, context));
            }
        }

        indicators
    }

    async fn analyze(&self, message_text: &str, context: &MessageContext) -> Option<ConcernAnalysis> {
        let prompt = prompts::build_concern_prompt(message_text, context);
        let response = match self.generator.generate(&prompt, 300).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "concern analysis unavailable, using heuristics");
                return None;
            }
        };
        let parsed = prompts::extract_json(&response)
            .and_then(|json| serde_json::from_str::<ConcernAnalysis>(json).ok());
        if parsed.is_none() {
            warn!("concern analysis response invalid, using heuristics");
        }
        parsed
    }

    fn fallback_indicators(message_text: &str, context: &MessageContext) -> Vec<ConcernIndicator> {
        let mut indicators = Vec::new();
        let text_lower = message_text.to_lowercase();

        if HOPELESSNESS_KEYWORDS.iter().any(|k| text_lower.contains(k)) {
            indicators.push(ConcernIndicator::HopelessnessThemes);
        }
        if context.behavioral.engagement_drop_percentage > 0.5 {
            indicators.push(ConcernIndicator::SignificantEngagementDrop);
        }

        indicators
    }
}
