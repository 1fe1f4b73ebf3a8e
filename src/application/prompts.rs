//! Prompt construction for the model-backed analysis steps.
//!
//! Every prompt that expects structured output asks for JSON explicitly;
//! [`extract_json`] tolerates markdown fencing around the payload.

use crate::domain::baseline::StudentBaseline;
use crate::domain::message::{MessageContext, Speaker};

/// Pulls the outermost JSON object out of a model response, tolerating
/// surrounding prose or markdown fences.
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

/// System rules embedded in every reply-generation prompt.
const SAFETY_RULES: &str = "\
Safety rules you must follow:
- Never give medical advice, diagnoses, or medication recommendations.
- Never minimize or dismiss expressed feelings.
- Never promise confidentiality you cannot keep.
- Encourage professional support when distress is evident.
- Be warm, specific, and brief.";

/// Builds the reply-generation prompt with safety rules embedded and the
/// recent conversation inlined.
pub fn build_reply_prompt(message_text: &str, context: &MessageContext) -> String {
    let history_text = if context.conversation_history.is_empty() {
        "No previous conversation.".to_string()
    } else {
        context
            .conversation_history
            .iter()
            .rev()
            .take(10)
            .rev()
            .map(|turn| {
                let who = match turn.speaker {
                    Speaker::Student => "Student",
                    Speaker::Assistant => "You",
                };
                format!("{}: {}", who, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are a supportive companion for a college student.\n\n\
        {SAFETY_RULES}\n\n\
        Recent conversation:\n{history_text}\n\n\
        Student: {message_text}\n\n\
        Respond with empathy in 2-4 sentences."
    )
}

/// Builds the contextual risk analysis prompt. The response contract is a
/// single JSON object with suicidal ideation, depression indicators, and
/// overall context sections.
pub fn build_contextual_risk_prompt(message_text: &str, context: &MessageContext) -> String {
    let history_text = if context.conversation_history.is_empty() {
        "No previous conversation history available.".to_string()
    } else {
        context
            .conversation_history
            .iter()
            .rev()
            .take(5)
            .rev()
            .map(|turn| format!("Previous: {}", truncate(&turn.text, 100)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let baseline_info = match &context.student.baseline {
        Some(baseline) if baseline.sample_count > 0 => format!(
            "\nStudent Baseline:\n\
            - Typical sentiment: {:.2}\n\
            - Typical emotionality: {}\n",
            baseline.sentiment_score.mean(),
            baseline.typical_emotionality(),
        ),
        _ => String::new(),
    };

    format!(
        "Analyze this message for mental health risk in context:\n\n\
        Current Message: \"{message_text}\"\n\n\
        Conversation History:\n{history_text}\n\
        {baseline_info}\n\
        Consider:\n\
        1. Is suicidal ideation literal or idiomatic? (e.g., \"I want to kill myself\" in gaming context vs serious context)\n\
        2. What is the emotional context and tone?\n\
        3. How does this relate to previous messages?\n\
        4. Are there concerning patterns or escalation?\n\
        5. Distinguish between:\n\
           - Literal threats: \"I'm planning to kill myself\"\n\
           - Idiomatic expressions: \"I'm so tired I could kill myself\"\n\
           - Gaming/casual: \"I want to kill this boss\" or \"killing it at work\"\n\
           - Sarcasm/dark humor: \"life is great, totally not dying inside\"\n\n\
        Respond in JSON format only:\n\
        {{\n\
          \"suicidal_ideation\": {{\n\
            \"present\": boolean,\n\
            \"is_literal\": boolean,\n\
            \"confidence\": 0.0-1.0,\n\
            \"reasoning\": \"string explaining your assessment\"\n\
          }},\n\
          \"depression_indicators\": {{\n\
            \"severity_estimate\": \"LOW|MEDIUM|HIGH\",\n\
            \"confidence\": 0.0-1.0,\n\
            \"indicators\": [\"list\", \"of\", \"indicators\"],\n\
            \"reasoning\": \"string explaining your assessment\"\n\
          }},\n\
          \"overall_context\": {{\n\
            \"tone\": \"string describing tone\",\n\
            \"escalation\": boolean,\n\
            \"concern_level\": \"LOW|MEDIUM|HIGH|CRISIS\"\n\
          }}\n\
        }}"
    )
}

/// Builds the emoji interpretation prompt with the student's personal
/// baseline inlined when one exists.
pub fn build_emoji_prompt(message_text: &str, baseline: Option<&StudentBaseline>) -> String {
    let baseline_info = match baseline {
        Some(b) if b.sample_count > 0 => format!(
            "\nStudent's typical emoji patterns:\n\
            - Uses emojis {}\n\
            - Common emojis: {}\n\
            - Typical function: {}\n",
            b.emoji_frequency_label(),
            b.top_emojis(5).join(", "),
            b.typical_emoji_function().unwrap_or("unknown"),
        ),
        _ => String::new(),
    };

    format!(
        "Analyze this message for genuine distress vs. casual expression:\n\n\
        Message: \"{message_text}\"\n\
        {baseline_info}\n\
        Consider:\n\
        1. The emoji's typical usage in this demographic (college students)\n\
        2. The relationship between emoji and text content\n\
        3. Whether the emoji amplifies, contradicts, or softens the text\n\
        4. How this compares to the student's personal baseline\n\n\
        Respond in JSON format:\n\
        {{\n\
          \"genuine_distress\": boolean,\n\
          \"confidence\": 0-1,\n\
          \"reasoning\": string,\n\
          \"emoji_function\": \"humor\" | \"emphasis\" | \"literal\" | \"ambiguous\",\n\
          \"emoji_context\": {{\n\
            \"emojis_found\": [list of emojis],\n\
            \"text_emoji_alignment\": \"amplifies\" | \"contradicts\" | \"softens\" | \"neutral\"\n\
          }}\n\
        }}"
    )
}

/// Builds the concern-indicator analysis prompt over the recent history.
pub fn build_concern_prompt(message_text: &str, context: &MessageContext) -> String {
    let history_text = if context.conversation_history.is_empty() {
        "No previous messages.".to_string()
    } else {
        context
            .conversation_history
            .iter()
            .filter(|t| t.speaker == Speaker::Student)
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take(5)
            .rev()
            .map(|t| format!("- {}", truncate(&t.text, 120)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Compare this student's current message against their recent messages:\n\n\
        Current message: \"{message_text}\"\n\n\
        Recent messages:\n{history_text}\n\n\
        Engagement drop over last 7 days: {:.0}%\n\n\
        Determine:\n\
        1. Language shift: Sudden change in tone, vocabulary, or style\n\
        2. Hopelessness themes: Expressions of hopelessness, worthlessness, or no future\n\
        3. Engagement drop: Signs of withdrawal or disengagement\n\
        4. Sudden mood change: Abrupt emotional shift from their baseline\n\n\
        Respond in JSON:\n\
        {{\n\
          \"language_shift_detected\": boolean,\n\
          \"hopelessness_themes\": boolean,\n\
          \"engagement_drop\": boolean,\n\
          \"sudden_mood_change\": boolean,\n\
          \"reasoning\": \"brief explanation\"\n\
        }}",
        context.behavioral.engagement_drop_percentage * 100.0
    )
}

/// Builds the passive-monitoring baseline prompt (sentiment and humor).
pub fn build_baseline_prompt(message_text: &str) -> String {
    format!(
        "Analyze this message for baseline tracking:\n\n\
        Message: \"{message_text}\"\n\n\
        Determine:\n\
        1. Sentiment: \"positive\", \"neutral\", or \"negative\" (on a -1 to +1 scale, map to these categories)\n\
        2. Contains humor: boolean (sarcasm, jokes, lighthearted tone)\n\n\
        Respond in JSON:\n\
        {{\n\
          \"sentiment\": \"positive|neutral|negative\",\n\
          \"sentiment_score\": -1.0 to 1.0,\n\
          \"contains_humor\": boolean,\n\
          \"reasoning\": \"brief explanation\"\n\
        }}"
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
