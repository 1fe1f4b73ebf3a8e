//! Per-student communication baselines.
//!
//! Baselines are built incrementally during passive monitoring and consulted
//! by the emoji interpreter, the risk calculator, and the deviation check.
//! Statistics use running aggregates, so observing a message is O(1) and the
//! stored record stays bounded regardless of history length.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse mood classification on a five-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl Mood {
    /// Numeric score, -2 for very negative through +2 for very positive.
    pub fn score(self) -> f64 {
        match self {
            Mood::VeryNegative => -2.0,
            Mood::Negative => -1.0,
            Mood::Neutral => 0.0,
            Mood::Positive => 1.0,
            Mood::VeryPositive => 2.0,
        }
    }
}

/// Sentiment label attached to a passive-monitoring observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Default for Sentiment {
    fn default() -> Self {
        Sentiment::Neutral
    }
}

/// Welford running mean and variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation; zero until two observations exist.
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / self.count as f64).sqrt()
    }
}

/// One passive-monitoring observation of a student message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageObservation {
    pub message_length: usize,
    pub emoji_count: usize,
    pub emojis: Vec<String>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub contains_humor: bool,
    pub mood: Mood,
}

/// A student's accumulated communication baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentBaseline {
    pub message_length: RunningStats,
    pub emoji_count: RunningStats,
    pub sentiment_score: RunningStats,
    pub mood: RunningStats,
    /// Occurrence counts per emoji, for "common emojis" context.
    #[serde(default)]
    pub common_emojis: HashMap<String, u64>,
    /// How often each interpreted emoji function has been seen.
    #[serde(default)]
    pub emoji_functions: HashMap<String, u64>,
    #[serde(default)]
    pub humor_count: u64,
    #[serde(default)]
    pub sample_count: u64,
}

impl StudentBaseline {
    /// Folds one observed message into the baseline.
    pub fn observe_message(&mut self, obs: &MessageObservation) {
        self.message_length.observe(obs.message_length as f64);
        self.emoji_count.observe(obs.emoji_count as f64);
        self.sentiment_score.observe(obs.sentiment_score);
        self.mood.observe(obs.mood.score());
        for emoji in &obs.emojis {
            *self.common_emojis.entry(emoji.clone()).or_insert(0) += 1;
        }
        if obs.contains_humor {
            self.humor_count += 1;
        }
        self.sample_count += 1;
    }

    /// Records the interpreted function of emoji usage in one message.
    pub fn observe_emoji_function(&mut self, function: &str) {
        *self.emoji_functions.entry(function.to_string()).or_insert(0) += 1;
    }

    /// The most frequently seen emojis, most common first.
    pub fn top_emojis(&self, limit: usize) -> Vec<String> {
        let mut entries: Vec<_> = self.common_emojis.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter().take(limit).map(|(e, _)| e.clone()).collect()
    }

    /// The most frequently interpreted emoji function, if any.
    pub fn typical_emoji_function(&self) -> Option<&str> {
        self.emoji_functions
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(f, _)| f.as_str())
    }

    /// Qualitative emoji frequency for prompt context.
    pub fn emoji_frequency_label(&self) -> &'static str {
        let rate = self.emoji_count.mean();
        if rate > 2.0 {
            "frequently"
        } else if rate > 0.5 {
            "moderately"
        } else {
            "rarely"
        }
    }

    /// True when at least three mood samples exist, the minimum for the
    /// deviation check to be meaningful.
    pub fn has_mood_baseline(&self) -> bool {
        self.mood.count() >= 3
    }

    /// Whether a mood score sits more than two standard deviations from
    /// this student's established mean. Always false without a baseline.
    pub fn mood_deviates(&self, current_mood: f64) -> bool {
        if !self.has_mood_baseline() {
            return false;
        }
        let deviation = (current_mood - self.mood.mean()).abs();
        deviation > 2.0 * self.mood.std_dev()
    }

    /// "high" when mood varies widely, "low" otherwise.
    pub fn typical_emotionality(&self) -> &'static str {
        if self.mood.std_dev() > 1.0 {
            "high"
        } else {
            "low"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(mood: Mood, text_len: usize) -> MessageObservation {
        MessageObservation {
            message_length: text_len,
            emoji_count: 0,
            emojis: Vec::new(),
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            contains_humor: false,
            mood,
        }
    }

    #[test]
    fn running_stats_match_direct_computation() {
        let mut stats = RunningStats::default();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.observe(v);
        }
        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-9);
        assert!((stats.std_dev() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn deviation_requires_three_mood_samples() {
        let mut baseline = StudentBaseline::default();
        baseline.observe_message(&observation(Mood::Neutral, 40));
        baseline.observe_message(&observation(Mood::Positive, 45));
        assert!(!baseline.has_mood_baseline());
        assert!(!baseline.mood_deviates(-2.0));
    }

    #[test]
    fn stable_mood_flags_large_swings() {
        let mut baseline = StudentBaseline::default();
        for _ in 0..5 {
            baseline.observe_message(&observation(Mood::Positive, 50));
        }
        baseline.observe_message(&observation(Mood::Neutral, 50));
        assert!(baseline.has_mood_baseline());
        assert!(baseline.mood_deviates(Mood::VeryNegative.score()));
        assert!(!baseline.mood_deviates(Mood::Positive.score()));
    }

    #[test]
    fn top_emojis_orders_by_count() {
        let mut baseline = StudentBaseline::default();
        let obs = MessageObservation {
            message_length: 20,
            emoji_count: 3,
            emojis: vec!["😭".to_string(), "😂".to_string(), "😂".to_string()],
            sentiment: Sentiment::Negative,
            sentiment_score: -0.4,
            contains_humor: true,
            mood: Mood::Negative,
        };
        baseline.observe_message(&obs);
        assert_eq!(baseline.top_emojis(1), vec!["😂".to_string()]);
        assert_eq!(baseline.humor_count, 1);
    }

    #[test]
    fn emoji_function_distribution_tracks_mode() {
        let mut baseline = StudentBaseline::default();
        baseline.observe_emoji_function("humor");
        baseline.observe_emoji_function("humor");
        baseline.observe_emoji_function("literal");
        assert_eq!(baseline.typical_emoji_function(), Some("humor"));
    }
}
