//! Trajectory analysis service over the stored risk history.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::StudentId;
use crate::domain::risk::RiskProfile;
use crate::domain::temporal::{analyze_trajectory, TemporalSnapshot, TrajectoryAnalysis};
use crate::ports::{PersistenceError, StudentRepository};

/// Days of history the trajectory window covers.
pub const TRAJECTORY_WINDOW_DAYS: i64 = 30;

/// Loads a student's recent risk history and analyzes its trajectory.
pub struct TemporalAnalyzer {
    repository: Arc<dyn StudentRepository>,
}

impl TemporalAnalyzer {
    pub fn new(repository: Arc<dyn StudentRepository>) -> Self {
        Self { repository }
    }

    pub async fn analyze(
        &self,
        student_id: &StudentId,
    ) -> Result<TrajectoryAnalysis, PersistenceError> {
        let history = self
            .repository
            .get_risk_history(student_id, TRAJECTORY_WINDOW_DAYS)
            .await?;
        let snapshots: Vec<TemporalSnapshot> = history.iter().map(snapshot_from).collect();
        let analysis = analyze_trajectory(&snapshots);
        debug!(
            student_id = %student_id,
            points = snapshots.len(),
            patterns = analysis.patterns.len(),
            snapshot_only = analysis.snapshot_only,
            "trajectory analyzed"
        );
        Ok(analysis)
    }
}

fn snapshot_from(profile: &RiskProfile) -> TemporalSnapshot {
    TemporalSnapshot {
        date: profile.calculated_at,
        risk_score: f64::from(profile.overall_risk.code()),
        confidence: profile.confidence.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::domain::risk::{Confidence, RecommendedAction, RiskFactors, RiskLevel};
    use chrono::{Duration, Utc};

    fn profile(student_id: &StudentId, level: RiskLevel, days_ago: i64) -> RiskProfile {
        RiskProfile {
            student_id: student_id.clone(),
            overall_risk: level,
            confidence: Confidence::clamped(0.8),
            risk_factors: RiskFactors::default(),
            recommended_action: RecommendedAction::ContinueMonitoring,
            temporal_patterns: Vec::new(),
            calculated_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[tokio::test]
    async fn fresh_student_gets_snapshot_only() {
        let repo = Arc::new(InMemoryRepository::new());
        let analyzer = TemporalAnalyzer::new(repo);
        let student = StudentId::new("stu-t").unwrap();

        let analysis = analyzer.analyze(&student).await.unwrap();
        assert!(analysis.snapshot_only);
    }

    #[tokio::test]
    async fn analysis_uses_recent_profiles() {
        let repo = Arc::new(InMemoryRepository::new());
        let student = StudentId::new("stu-t").unwrap();
        for days_ago in [9, 6, 3, 0] {
            repo.save_risk_profile(&profile(&student, RiskLevel::High, days_ago))
                .await
                .unwrap();
        }
        // Outside the 30-day window, must not count.
        repo.save_risk_profile(&profile(&student, RiskLevel::Low, 45))
            .await
            .unwrap();

        let analyzer = TemporalAnalyzer::new(repo);
        let analysis = analyzer.analyze(&student).await.unwrap();
        assert!(!analysis.snapshot_only);
        assert!(analysis
            .patterns
            .contains(&crate::domain::risk::TemporalPattern::ChronicElevated));
    }
}
