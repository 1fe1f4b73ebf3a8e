//! Deep-analysis value objects: emoji interpretation and concern indicators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role emojis play in a message, as interpreted in context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiFunction {
    Humor,
    Emphasis,
    Literal,
    Ambiguous,
}

impl fmt::Display for EmojiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmojiFunction::Humor => "humor",
            EmojiFunction::Emphasis => "emphasis",
            EmojiFunction::Literal => "literal",
            EmojiFunction::Ambiguous => "ambiguous",
        };
        write!(f, "{}", s)
    }
}

/// How the emojis relate to the text around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEmojiAlignment {
    Amplifies,
    Contradicts,
    Softens,
    Neutral,
}

/// Raw context returned with an emoji interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiContext {
    #[serde(default)]
    pub emojis_found: Vec<String>,
    #[serde(default = "default_alignment")]
    pub text_emoji_alignment: TextEmojiAlignment,
}

fn default_alignment() -> TextEmojiAlignment {
    TextEmojiAlignment::Neutral
}

impl Default for EmojiContext {
    fn default() -> Self {
        Self {
            emojis_found: Vec::new(),
            text_emoji_alignment: TextEmojiAlignment::Neutral,
        }
    }
}

/// Interpretation of emoji usage in one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiVerdict {
    pub genuine_distress: bool,
    pub confidence: f64,
    pub reasoning: String,
    pub emoji_function: EmojiFunction,
    #[serde(default)]
    pub emoji_context: EmojiContext,
}

impl EmojiVerdict {
    /// Conservative verdict used when interpretation is unavailable.
    /// Never claims distress it could not assess.
    pub fn analysis_failed() -> Self {
        Self {
            genuine_distress: false,
            confidence: 0.0,
            reasoning: "Analysis failed".to_string(),
            emoji_function: EmojiFunction::Ambiguous,
            emoji_context: EmojiContext::default(),
        }
    }
}

/// Closed set of concern indicators the deep-analysis checkpoint can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernIndicator {
    GenuineDistressEmoji,
    SuddenLanguageShift,
    HopelessnessThemes,
    SignificantEngagementDrop,
    SuddenMoodChange,
    CrisisDetected,
    SleepIssues,
    LowEnergy,
}

impl fmt::Display for ConcernIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConcernIndicator::GenuineDistressEmoji => "genuine_distress_emoji",
            ConcernIndicator::SuddenLanguageShift => "sudden_language_shift",
            ConcernIndicator::HopelessnessThemes => "hopelessness_themes",
            ConcernIndicator::SignificantEngagementDrop => "significant_engagement_drop",
            ConcernIndicator::SuddenMoodChange => "sudden_mood_change",
            ConcernIndicator::CrisisDetected => "crisis_detected",
            ConcernIndicator::SleepIssues => "sleep_issues",
            ConcernIndicator::LowEnergy => "low_energy",
        };
        write!(f, "{}", s)
    }
}

/// Extracts emoji characters from a message.
///
/// Covers the common emoji blocks: emoticons, symbols and pictographs,
/// transport, regional indicators, dingbats, and enclosed characters.
pub fn extract_emojis(text: &str) -> Vec<String> {
    text.chars()
        .filter(|&c| is_emoji(c))
        .map(|c| c.to_string())
        .collect()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x24C2..=0x1F251 | 0x1F300..=0x1F5FF | 0x1F600..=0x1F64F | 0x1F680..=0x1F6FF
    )
}
