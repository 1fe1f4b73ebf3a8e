//! Immediate safety screening for explicit crisis language.
//!
//! The screener is a deterministic pattern matcher: no model calls, no
//! suppression logic, a plain union of keyword hits. It runs first on every
//! message and its flags feed the downstream risk assessment.

use serde::{Deserialize, Serialize};

/// Crisis keywords that trigger the crisis protocol on a direct hit.
/// Matching is case-insensitive and tolerant of repeated whitespace.
const CRISIS_KEYWORDS: &[&str] = &[
    "kill myself",
    "end it all",
    "suicide",
    "goodbye forever",
    "won't be here tomorrow",
    "final message",
    "ending my life",
    "taking my life",
];

/// Phrasings that indicate a concrete plan.
const PLAN_INDICATORS: &[&str] = &[
    "plan to kill",
    "going to end",
    "method to",
    "way to die",
];

/// Medical-advice phrasings a generated reply must never contain.
const MEDICAL_ADVICE_PHRASES: &[&str] = &["prescribe ", "you should take medication"];

const REDACTION: &str = "[medical advice removed]";

/// Result of screening one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub crisis_detected: bool,
    /// One flag per matched pattern, naming the category and the phrase.
    pub flags: Vec<String>,
}

/// Deterministic crisis-language screener.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyScreener;

impl SafetyScreener {
    pub fn new() -> Self {
        Self
    }

    /// Screens a message for immediate safety concerns.
    ///
    /// Runs in O(text length); any match sets `crisis_detected`.
    pub fn screen(&self, text: &str) -> ScreenReport {
        let normalized = normalize(text);
        let mut report = ScreenReport::default();

        for keyword in CRISIS_KEYWORDS {
            if normalized.contains(keyword) {
                report.flags.push(format!("crisis_keyword: {}", keyword));
                report.crisis_detected = true;
            }
        }
        for indicator in PLAN_INDICATORS {
            if normalized.contains(indicator) {
                report.flags.push(format!("plan_indicator: {}", indicator));
                report.crisis_detected = true;
            }
        }

        report
    }

    /// Redacts medical-advice phrasings from a generated reply.
    pub fn filter_response(&self, response: &str) -> String {
        let mut filtered = redact_dosages(response);
        for phrase in MEDICAL_ADVICE_PHRASES {
            filtered = replace_ascii_ci(&filtered, phrase, REDACTION);
        }
        filtered
    }
}

/// Lowercases and collapses whitespace runs so multi-word patterns match
/// regardless of spacing or line breaks.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Replaces case-insensitive occurrences of an ASCII needle.
fn replace_ascii_ci(text: &str, needle: &str, replacement: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(pos) = lower[cursor..].find(&needle) {
        let start = cursor + pos;
        out.push_str(&text[cursor..start]);
        out.push_str(replacement);
        cursor = start + needle.len();
    }
    out.push_str(&text[cursor..]);
    out
}

/// Redacts dosage instructions of the form "take <number> mg".
fn redact_dosages(text: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(pos) = lower[cursor..].find("take") {
        let start = cursor + pos;
        if let Some(end) = match_dosage_tail(bytes, start + 4) {
            out.push_str(&text[cursor..start]);
            out.push_str(REDACTION);
            cursor = end;
        } else {
            out.push_str(&text[cursor..start + 4]);
            cursor = start + 4;
        }
    }
    out.push_str(&text[cursor..]);
    out
}

/// After "take", expects whitespace, digits, optional whitespace, "mg".
/// Returns the byte offset one past the match.
fn match_dosage_tail(bytes: &[u8], mut i: usize) -> Option<usize> {
    let n = bytes.len();
    let ws_start = i;
    while i < n && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i == ws_start {
        return None;
    }
    let digit_start = i;
    while i < n && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digit_start {
        return None;
    }
    while i < n && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i + 1 < n && bytes[i] == b'm' && bytes[i + 1] == b'g' {
        Some(i + 2)
    } else {
        None
    }
}
