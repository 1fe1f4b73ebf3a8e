//! Trajectory analysis over a student's risk history.
//!
//! Pure time-series math: the application layer loads the last 30 days of
//! risk profiles, maps them to snapshots, and calls [`analyze_trajectory`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::risk::TemporalPattern;

/// One point of a student's risk time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalSnapshot {
    pub date: DateTime<Utc>,
    /// Ordinal risk score, LOW = 1 through CRISIS = 4.
    pub risk_score: f64,
    pub confidence: f64,
}

/// Result of analyzing a risk trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryAnalysis {
    pub patterns: Vec<TemporalPattern>,
    /// Average daily change in risk score.
    pub velocity: f64,
    /// Change in velocity between the two halves of the window.
    pub acceleration: f64,
    pub risk_multiplier: f64,
    /// True when fewer than three points were available and the analysis
    /// carries no trajectory information.
    pub snapshot_only: bool,
}

impl TrajectoryAnalysis {
    /// Zeroed analysis for a history too short to say anything about.
    pub fn snapshot_only() -> Self {
        Self {
            patterns: Vec::new(),
            velocity: 0.0,
            acceleration: 0.0,
            risk_multiplier: 1.0,
            snapshot_only: true,
        }
    }
}

/// Analyzes a risk history ordered oldest first.
///
/// Histories shorter than three points yield a snapshot-only result.
pub fn analyze_trajectory(history: &[TemporalSnapshot]) -> TrajectoryAnalysis {
    if history.len() < 3 {
        return TrajectoryAnalysis::snapshot_only();
    }

    let velocity = calculate_velocity(history);
    let acceleration = calculate_acceleration(history);
    let patterns = detect_patterns(history, velocity, acceleration);
    let risk_multiplier = calculate_risk_multiplier(&patterns);

    TrajectoryAnalysis {
        patterns,
        velocity,
        acceleration,
        risk_multiplier,
        snapshot_only: false,
    }
}

/// Elapsed whole days between the first and last snapshot.
fn elapsed_days(history: &[TemporalSnapshot]) -> i64 {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days(),
        _ => 0,
    }
}

fn calculate_velocity(history: &[TemporalSnapshot]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let total_days = elapsed_days(history);
    if total_days == 0 {
        return 0.0;
    }
    let score_change = history[history.len() - 1].risk_score - history[0].risk_score;
    score_change / total_days as f64
}

fn calculate_acceleration(history: &[TemporalSnapshot]) -> f64 {
    if history.len() < 3 {
        return 0.0;
    }
    // The halves share the midpoint so each spans at least two points.
    let mid = history.len() / 2;
    let v1 = calculate_velocity(&history[..=mid]);
    let v2 = calculate_velocity(&history[mid..]);

    let total_days = elapsed_days(history);
    if total_days == 0 {
        return 0.0;
    }
    (v2 - v1) / (total_days as f64 / 2.0)
}

fn detect_patterns(
    history: &[TemporalSnapshot],
    velocity: f64,
    acceleration: f64,
) -> Vec<TemporalPattern> {
    let scores: Vec<f64> = history.iter().map(|s| s.risk_score).collect();
    let mut patterns = Vec::new();

    if velocity < -0.5 && acceleration < 0.0 {
        patterns.push(TemporalPattern::RapidDeterioration);
    }
    if detect_pre_decision_calm(&scores) {
        patterns.push(TemporalPattern::PreDecisionCalm);
    }
    if mean(&scores) > 2.5 && std_dev(&scores) < 0.5 {
        patterns.push(TemporalPattern::ChronicElevated);
    }
    if detect_cyclical(&scores) {
        patterns.push(TemporalPattern::Cyclical);
    }
    if detect_disengagement(history) {
        patterns.push(TemporalPattern::Disengagement);
    }

    patterns
}

/// Sudden improvement after sustained distress. Clinically the most
/// dangerous trajectory, so it demands at least five points of evidence.
fn detect_pre_decision_calm(scores: &[f64]) -> bool {
    if scores.len() < 5 {
        return false;
    }
    let split_point = (scores.len() as f64 * 0.7) as usize;
    let first_part = &scores[..split_point];
    let last_part = &scores[split_point..];
    if first_part.is_empty() || last_part.is_empty() {
        return false;
    }

    let first_mean = mean(first_part);
    let last_mean = mean(last_part);
    first_mean >= 3.0 && last_mean < 2.0 && (first_mean - last_mean) > 1.5
}

/// Alternating rises and falls across most of the window.
fn detect_cyclical(scores: &[f64]) -> bool {
    if scores.len() < 6 {
        return false;
    }
    let differences: Vec<f64> = scores.windows(2).map(|w| w[1] - w[0]).collect();
    let sign_changes = differences
        .windows(2)
        .filter(|w| (w[0] > 0.0) != (w[1] > 0.0))
        .count();
    sign_changes as f64 > scores.len() as f64 * 0.5
}

/// Message frequency in the late half dropping below half of the early
/// half's frequency.
fn detect_disengagement(history: &[TemporalSnapshot]) -> bool {
    if history.len() < 3 {
        return false;
    }
    let start_date = history[0].date;
    let end_date = history[history.len() - 1].date;
    let total_days = (end_date - start_date).num_days();
    if total_days == 0 {
        return false;
    }

    let mid_date = start_date + Duration::days(total_days / 2);
    let early_count = history.iter().filter(|s| s.date < mid_date).count();
    let late_count = history.len() - early_count;

    let early_period_days = (mid_date - start_date).num_days();
    let late_period_days = (end_date - mid_date).num_days();
    if early_period_days == 0 || late_period_days == 0 {
        return false;
    }

    let early_freq = early_count as f64 / early_period_days as f64;
    let late_freq = late_count as f64 / late_period_days as f64;
    late_freq < early_freq * 0.5
}

fn calculate_risk_multiplier(patterns: &[TemporalPattern]) -> f64 {
    let mut multiplier = 1.0;
    for pattern in patterns {
        multiplier *= match pattern {
            TemporalPattern::RapidDeterioration => 2.0,
            TemporalPattern::PreDecisionCalm => 3.0,
            TemporalPattern::ChronicElevated => 1.5,
            TemporalPattern::Disengagement => 1.3,
            TemporalPattern::Cyclical => 1.0,
        };
    }
    multiplier
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(day: i64, score: f64) -> TemporalSnapshot {
        TemporalSnapshot {
            date: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::days(day),
            risk_score: score,
            confidence: 0.8,
        }
    }

    #[test]
    fn short_history_is_snapshot_only() {
        let analysis = analyze_trajectory(&[snapshot(0, 2.0), snapshot(1, 3.0)]);
        assert!(analysis.snapshot_only);
        assert!(analysis.patterns.is_empty());
        assert_eq!(analysis.velocity, 0.0);
        assert_eq!(analysis.risk_multiplier, 1.0);
    }

    #[test]
    fn velocity_is_average_daily_change() {
        let history = [snapshot(0, 1.0), snapshot(5, 2.0), snapshot(10, 3.0)];
        let analysis = analyze_trajectory(&history);
        assert!((analysis.velocity - 0.2).abs() < 1e-9);
        assert!(!analysis.snapshot_only);
    }

    #[test]
    fn same_day_history_has_zero_velocity() {
        let history = [snapshot(0, 1.0), snapshot(0, 2.0), snapshot(0, 4.0)];
        let analysis = analyze_trajectory(&history);
        assert_eq!(analysis.velocity, 0.0);
        assert_eq!(analysis.acceleration, 0.0);
    }

    #[test]
    fn chronic_elevated_requires_stable_high_scores() {
        let history = [
            snapshot(0, 3.0),
            snapshot(3, 3.0),
            snapshot(6, 3.0),
            snapshot(9, 3.0),
        ];
        let analysis = analyze_trajectory(&history);
        assert!(analysis.patterns.contains(&TemporalPattern::ChronicElevated));
        assert!((analysis.risk_multiplier - 1.5).abs() < 1e-9);
    }

    #[test]
    fn pre_decision_calm_detects_sudden_improvement() {
        // Sustained high distress for the first 70%, then a sharp drop.
        let history = [
            snapshot(0, 4.0),
            snapshot(2, 3.0),
            snapshot(4, 4.0),
            snapshot(6, 3.0),
            snapshot(8, 1.0),
            snapshot(10, 1.0),
        ];
        let analysis = analyze_trajectory(&history);
        assert!(analysis.patterns.contains(&TemporalPattern::PreDecisionCalm));
        assert!(analysis.risk_multiplier >= 3.0);
    }

    #[test]
    fn cyclical_detects_alternating_scores() {
        let history = [
            snapshot(0, 1.0),
            snapshot(2, 3.0),
            snapshot(4, 1.0),
            snapshot(6, 3.0),
            snapshot(8, 1.0),
            snapshot(10, 3.0),
        ];
        let analysis = analyze_trajectory(&history);
        assert!(analysis.patterns.contains(&TemporalPattern::Cyclical));
    }

    #[test]
    fn disengagement_detects_frequency_drop() {
        // Dense early contact, a single late message.
        let history = [
            snapshot(0, 2.0),
            snapshot(1, 2.0),
            snapshot(2, 2.0),
            snapshot(3, 2.0),
            snapshot(4, 2.0),
            snapshot(20, 2.0),
        ];
        let analysis = analyze_trajectory(&history);
        assert!(analysis.patterns.contains(&TemporalPattern::Disengagement));
    }

    #[test]
    fn steady_low_history_detects_nothing() {
        let history = [
            snapshot(0, 1.0),
            snapshot(5, 1.0),
            snapshot(10, 1.0),
            snapshot(15, 1.0),
        ];
        let analysis = analyze_trajectory(&history);
        assert!(analysis.patterns.is_empty());
        assert_eq!(analysis.risk_multiplier, 1.0);
    }
}
