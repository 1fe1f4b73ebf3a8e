//! Multi-factor risk calculation with confidence calibration.
//!
//! Three factors are assessed independently, each with its own confidence:
//! suicidal ideation, depression severity, and behavior change. The overall
//! level is the maximum contributing level, never an average, and the
//! overall confidence is the mean of the contributing confidences.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::domain::analysis::ConcernIndicator;
use crate::domain::assessment::AssessmentKind;
use crate::domain::foundation::StudentId;
use crate::domain::message::MessageContext;
use crate::domain::risk::{
    AlertRecommendation, BehaviorChange, Confidence, ConcernLevel, DepressionSeverity,
    RecommendedAction, RiskFactors, RiskLevel, RiskProfile, SuicidalIdeation, TemporalPattern,
};
use crate::domain::temporal::TrajectoryAnalysis;
use crate::ports::{PersistenceError, StudentRepository, TextGenerator};

use super::prompts;

/// Phrases the keyword fallback matches when contextual analysis is
/// unavailable. Matches are low confidence and always flagged for review.
const FALLBACK_IDEATION_PHRASES: &[&str] = &[
    "kill myself",
    "kill my self",
    "killing myself",
    "killing my self",
    "end it all",
    "ending my life",
    "taking my life",
    "suicide",
];

/// Severity estimates the contextual analysis may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum SeverityEstimate {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
}

#[derive(Debug, Deserialize)]
struct IdeationSection {
    present: bool,
    #[serde(default)]
    is_literal: Option<bool>,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct DepressionSection {
    #[serde(default)]
    severity_estimate: Option<SeverityEstimate>,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

fn default_confidence() -> f64 {
    0.5
}

#[derive(Debug, Default, Deserialize)]
struct OverallContextSection {
    #[serde(default)]
    tone: String,
}

/// Parsed contextual risk analysis from the model.
#[derive(Debug, Deserialize)]
struct ContextualAnalysis {
    suicidal_ideation: IdeationSection,
    depression_indicators: DepressionSection,
    #[serde(default)]
    overall_context: OverallContextSection,
}

impl ContextualAnalysis {
    fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.suicidal_ideation.confidence)
    }
}

/// Outcome of the contextual analysis step, fallback included.
#[derive(Debug)]
struct AnalysisOutcome {
    analysis: ContextualAnalysis,
    degraded: bool,
}

/// Multi-dimensional risk profile calculator.
pub struct RiskCalculator {
    generator: Arc<dyn TextGenerator>,
    repository: Arc<dyn StudentRepository>,
}

impl RiskCalculator {
    pub fn new(generator: Arc<dyn TextGenerator>, repository: Arc<dyn StudentRepository>) -> Self {
        Self {
            generator,
            repository,
        }
    }

    /// Computes, persists, and returns the risk profile for one message,
    /// along with its alert routing recommendation.
    pub async fn calculate_risk(
        &self,
        student_id: &StudentId,
        message_text: &str,
        context: &MessageContext,
        concern_indicators: &[ConcernIndicator],
        trajectory: &TrajectoryAnalysis,
    ) -> Result<(RiskProfile, AlertRecommendation), PersistenceError> {
        info!(
            student_id = %student_id,
            message_length = message_text.len(),
            indicators = concern_indicators.len(),
            "risk calculation started"
        );

        let suicidal_ideation = self
            .assess_suicidal_ideation(student_id, message_text, context)
            .await?;
        let depression_severity = self
            .assess_depression_severity(student_id, message_text, context, concern_indicators)
            .await?;
        let behavior_change = Self::assess_behavior_change(context);

        let risk_factors = RiskFactors {
            suicidal_ideation,
            depression_severity,
            behavior_change,
        };

        let (overall_risk, confidence) = Self::fuse(&risk_factors, trajectory);
        let recommended_action = RecommendedAction::for_risk(overall_risk, confidence);

        let profile = RiskProfile {
            student_id: student_id.clone(),
            overall_risk,
            confidence,
            risk_factors,
            recommended_action,
            temporal_patterns: trajectory.patterns.clone(),
            calculated_at: Utc::now(),
        };

        self.repository.save_risk_profile(&profile).await?;
        info!(
            student_id = %student_id,
            overall_risk = %overall_risk,
            confidence = confidence.value(),
            "risk profile saved"
        );

        let alert = AlertRecommendation::for_profile(&profile);
        Ok((profile, alert))
    }

    /// Ideation precedence: safety flags, then a validated C-SSRS on
    /// record, then contextual analysis, then the keyword fallback.
    async fn assess_suicidal_ideation(
        &self,
        student_id: &StudentId,
        message_text: &str,
        context: &MessageContext,
    ) -> Result<Option<SuicidalIdeation>, PersistenceError> {
        if context.crisis_detected || !context.safety_flags.is_empty() {
            info!(
                student_id = %student_id,
                flags = context.safety_flags.len(),
                "ideation confirmed by safety screen"
            );
            return Ok(Some(SuicidalIdeation {
                present: true,
                confidence: Confidence::clamped(0.95),
                is_literal: None,
                reason: "Crisis keywords detected in safety screen".to_string(),
                requires_human_review: false,
            }));
        }

        let cssrs = self
            .repository
            .get_latest_assessment(student_id, AssessmentKind::Cssrs)
            .await?;
        if let Some(record) = cssrs {
            if record.score > 0 {
                return Ok(Some(SuicidalIdeation {
                    present: true,
                    confidence: Confidence::clamped(0.95),
                    is_literal: None,
                    reason: format!("Validated C-SSRS score: {}", record.score),
                    requires_human_review: false,
                }));
            }
        }

        let outcome = self.analyze_contextual_risk(message_text, context).await;
        let si = &outcome.analysis.suicidal_ideation;
        if !si.present {
            return Ok(None);
        }
        Ok(Some(SuicidalIdeation {
            present: true,
            confidence: Confidence::clamped(si.confidence),
            is_literal: si.is_literal,
            reason: if si.reasoning.is_empty() {
                "Contextual analysis indicates suicidal ideation".to_string()
            } else {
                si.reasoning.clone()
            },
            requires_human_review: outcome.degraded,
        }))
    }

    /// Severity precedence: validated PHQ-9 on record, then contextual
    /// estimate, then the sleep-and-energy heuristic.
    async fn assess_depression_severity(
        &self,
        student_id: &StudentId,
        message_text: &str,
        context: &MessageContext,
        concern_indicators: &[ConcernIndicator],
    ) -> Result<Option<DepressionSeverity>, PersistenceError> {
        if let Some(assessment) = self
            .repository
            .get_latest_assessment(student_id, AssessmentKind::Phq9)
            .await?
        {
            return Ok(Some(DepressionSeverity {
                estimated_phq9: assessment.score,
                confidence: Confidence::clamped(0.9),
                reason: "Based on validated PHQ-9 assessment".to_string(),
                is_estimate: false,
                requires_assessment: false,
            }));
        }

        let outcome = self.analyze_contextual_risk(message_text, context).await;
        let dep = &outcome.analysis.depression_indicators;
        if !outcome.degraded {
            match dep.severity_estimate {
                Some(SeverityEstimate::Medium) | Some(SeverityEstimate::High) => {
                    let estimated_phq9 = match dep.severity_estimate {
                        Some(SeverityEstimate::High) => 15,
                        _ => 10,
                    };
                    return Ok(Some(DepressionSeverity {
                        estimated_phq9,
                        // Not a validated instrument, so confidence is cut.
                        confidence: Confidence::clamped(dep.confidence * 0.7),
                        reason: format!(
                            "Contextual analysis: {}. Note: this is NOT a validated PHQ-9 score.",
                            if dep.reasoning.is_empty() {
                                "depression indicators detected"
                            } else {
                                &dep.reasoning
                            }
                        ),
                        is_estimate: true,
                        requires_assessment: false,
                    }));
                }
                _ => {}
            }
        }

        let sleep = concern_indicators.contains(&ConcernIndicator::SleepIssues);
        let energy = concern_indicators.contains(&ConcernIndicator::LowEnergy);
        if sleep && energy {
            return Ok(Some(DepressionSeverity {
                estimated_phq9: 11,
                confidence: Confidence::clamped(0.4),
                reason: "Mentioned sleep issues and low energy, but context unclear. \
                         Requires validated assessment."
                    .to_string(),
                is_estimate: true,
                requires_assessment: true,
            }));
        }

        Ok(None)
    }

    /// Behavior change reads engagement metadata only, never message
    /// content. Fluctuations below a 30% drop are not flagged.
    fn assess_behavior_change(context: &MessageContext) -> Option<BehaviorChange> {
        let drop = context.behavioral.engagement_drop_percentage;
        if drop > 0.6 {
            Some(BehaviorChange {
                concern: ConcernLevel::High,
                confidence: Confidence::clamped(0.88),
                reason: format!("Engagement dropped {:.0}% in last 7 days", drop * 100.0),
            })
        } else if drop > 0.3 {
            Some(BehaviorChange {
                concern: ConcernLevel::Medium,
                confidence: Confidence::clamped(0.75),
                reason: format!("Engagement dropped {:.0}% in last 7 days", drop * 100.0),
            })
        } else {
            None
        }
    }

    /// Runs contextual analysis, falling back to keyword matching on any
    /// generation or parse failure. Fallback results are degraded.
    async fn analyze_contextual_risk(
        &self,
        message_text: &str,
        context: &MessageContext,
    ) -> AnalysisOutcome {
        let prompt = prompts::build_contextual_risk_prompt(message_text, context);
        let response = match self.generator.generate(&prompt, 800).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "contextual analysis unavailable, using keyword fallback");
                return AnalysisOutcome {
                    analysis: Self::fallback_keyword_analysis(message_text),
                    degraded: true,
                };
            }
        };

        let parsed = prompts::extract_json(&response)
            .and_then(|json| serde_json::from_str::<ContextualAnalysis>(json).ok());
        match parsed {
            Some(analysis) if analysis.is_valid() => {
                let analysis = Self::calibrate_confidence(analysis, context);
                AnalysisOutcome {
                    analysis,
                    degraded: false,
                }
            }
            _ => {
                let preview: String = response.chars().take(200).collect();
                warn!(preview, "contextual analysis response invalid, using keyword fallback");
                AnalysisOutcome {
                    analysis: Self::fallback_keyword_analysis(message_text),
                    degraded: true,
                }
            }
        }
    }

    /// Adjusts raw model confidence for context availability, baseline
    /// availability, figurative language, and signal agreement. Each step
    /// clamps at 1.0 before the next applies.
    fn calibrate_confidence(
        mut analysis: ContextualAnalysis,
        context: &MessageContext,
    ) -> ContextualAnalysis {
        let history_len = context.conversation_history.len();
        let si = &mut analysis.suicidal_ideation;
        let mut conf = si.confidence;

        if history_len < 3 {
            conf *= 0.8;
        } else if history_len >= 10 {
            conf *= 1.1;
        }
        conf = conf.min(1.0);

        let has_baseline = context
            .student
            .baseline
            .as_ref()
            .is_some_and(|b| b.sample_count > 0);
        if has_baseline {
            conf *= 1.1;
        }
        conf = conf.min(1.0);

        let sarcastic = analysis.overall_context.tone.to_lowercase().contains("sarcasm");
        if !si.is_literal.unwrap_or(true) || sarcastic {
            conf *= 0.9;
        }
        conf = conf.min(1.0);

        if !context.safety_flags.is_empty() && si.present {
            conf *= 1.1;
        }
        si.confidence = conf.min(1.0);

        let dep = &mut analysis.depression_indicators;
        let mut dep_conf = dep.confidence;
        if history_len < 3 {
            dep_conf *= 0.8;
        } else if history_len >= 10 {
            dep_conf *= 1.1;
        }
        dep.confidence = dep_conf.min(1.0);

        debug!(
            ideation_confidence = analysis.suicidal_ideation.confidence,
            depression_confidence = analysis.depression_indicators.confidence,
            "confidence calibrated"
        );
        analysis
    }

    /// Conservative keyword matching. Any hit is low confidence so the
    /// profile routes to human review rather than automated alerting.
    fn fallback_keyword_analysis(message_text: &str) -> ContextualAnalysis {
        let normalized = message_text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let matched = FALLBACK_IDEATION_PHRASES
            .iter()
            .any(|phrase| normalized.contains(phrase));

        ContextualAnalysis {
            suicidal_ideation: IdeationSection {
                present: matched,
                is_literal: None,
                confidence: if matched { 0.3 } else { 0.0 },
                reasoning: "LLM unavailable, keyword match found - requires human review"
                    .to_string(),
            },
            depression_indicators: DepressionSection {
                severity_estimate: Some(SeverityEstimate::Low),
                confidence: 0.0,
                reasoning: "LLM unavailable, cannot assess depression indicators".to_string(),
            },
            overall_context: OverallContextSection::default(),
        }
    }

    /// Fuses factors and trajectory into (level, confidence). Maximum
    /// contributing level wins; confidence is the mean of contributors.
    fn fuse(
        risk_factors: &RiskFactors,
        trajectory: &TrajectoryAnalysis,
    ) -> (RiskLevel, Confidence) {
        let mut risk_codes: Vec<u8> = Vec::new();
        let mut confidences: Vec<f64> = Vec::new();

        if let Some(si) = &risk_factors.suicidal_ideation {
            if si.present {
                risk_codes.push(RiskLevel::Crisis.code());
                confidences.push(si.confidence.value());
            }
        }

        if let Some(dep) = &risk_factors.depression_severity {
            if dep.estimated_phq9 >= 20 {
                risk_codes.push(RiskLevel::Crisis.code());
            } else if dep.estimated_phq9 >= 15 {
                risk_codes.push(RiskLevel::High.code());
            } else if dep.estimated_phq9 >= 10 {
                risk_codes.push(RiskLevel::Medium.code());
            }
            confidences.push(dep.confidence.value());
        }

        if let Some(behavior) = &risk_factors.behavior_change {
            match behavior.concern {
                ConcernLevel::High => risk_codes.push(RiskLevel::High.code()),
                ConcernLevel::Medium => risk_codes.push(RiskLevel::Medium.code()),
                ConcernLevel::Low => {}
            }
            confidences.push(behavior.confidence.value());
        }

        if !trajectory.snapshot_only {
            for pattern in &trajectory.patterns {
                match pattern {
                    TemporalPattern::RapidDeterioration => {
                        risk_codes.push(RiskLevel::High.code());
                        confidences.push(0.8);
                    }
                    TemporalPattern::PreDecisionCalm => {
                        risk_codes.push(RiskLevel::Crisis.code());
                        confidences.push(0.95);
                    }
                    TemporalPattern::ChronicElevated => {
                        risk_codes.push(RiskLevel::Medium.code());
                        confidences.push(0.7);
                    }
                    TemporalPattern::Disengagement => {
                        risk_codes.push(RiskLevel::Medium.code());
                        confidences.push(0.6);
                    }
                    TemporalPattern::Cyclical => {}
                }
            }
        }

        let Some(max_code) = risk_codes.iter().copied().max() else {
            return (RiskLevel::Low, Confidence::clamped(0.5));
        };
        let confidence = if confidences.is_empty() {
            0.5
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };
        (RiskLevel::from_code(max_code), Confidence::clamped(confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::adapters::mock_generator::MockGenerator;
    use crate::domain::risk::Confidence;
    use proptest::prelude::*;

    fn calculator_with(generator: MockGenerator) -> RiskCalculator {
        RiskCalculator::new(Arc::new(generator), Arc::new(InMemoryRepository::new()))
    }

    fn student() -> StudentId {
        StudentId::new("stu-risk").unwrap()
    }

    fn contextual_json(present: bool, confidence: f64, severity: &str) -> String {
        format!(
            r#"{{
                "suicidal_ideation": {{
                    "present": {present},
                    "is_literal": true,
                    "confidence": {confidence},
                    "reasoning": "test"
                }},
                "depression_indicators": {{
                    "severity_estimate": "{severity}",
                    "confidence": 0.8,
                    "indicators": [],
                    "reasoning": "test"
                }},
                "overall_context": {{
                    "tone": "flat",
                    "escalation": false,
                    "concern_level": "LOW"
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn safety_flags_dominate_ideation() {
        let calc = calculator_with(MockGenerator::new());
        let mut context = MessageContext::empty(student());
        context.crisis_detected = true;
        context.safety_flags = vec!["crisis_keyword: kill myself".to_string()];

        let trajectory = TrajectoryAnalysis::snapshot_only();
        let (profile, alert) = calc
            .calculate_risk(&student(), "goodbye", &context, &[], &trajectory)
            .await
            .unwrap();

        assert_eq!(profile.overall_risk, RiskLevel::Crisis);
        let si = profile.risk_factors.suicidal_ideation.unwrap();
        assert!((si.confidence.value() - 0.95).abs() < 1e-9);
        assert!(!si.requires_human_review);
        assert!(alert.should_alert);
        assert_eq!(alert.priority_score, 100.0);
    }

    #[tokio::test]
    async fn keyword_fallback_requires_human_review() {
        // Generator fails; both analysis calls fall back to keywords.
        let calc = calculator_with(MockGenerator::failing());
        let context = MessageContext::empty(student());
        let trajectory = TrajectoryAnalysis::snapshot_only();

        let (profile, _) = calc
            .calculate_risk(
                &student(),
                "sometimes I think about suicide",
                &context,
                &[],
                &trajectory,
            )
            .await
            .unwrap();

        let si = profile.risk_factors.suicidal_ideation.unwrap();
        assert!(si.present);
        assert!((si.confidence.value() - 0.3).abs() < 1e-9);
        assert!(si.requires_human_review);
        assert_eq!(si.is_literal, None);
        // Present ideation is always CRISIS regardless of confidence.
        assert_eq!(profile.overall_risk, RiskLevel::Crisis);
    }

    #[tokio::test]
    async fn benign_message_is_low_risk() {
        let calc = calculator_with(
            MockGenerator::new()
                .with_response(contextual_json(false, 0.2, "LOW"))
                .with_response(contextual_json(false, 0.2, "LOW")),
        );
        let context = MessageContext::empty(student());
        let trajectory = TrajectoryAnalysis::snapshot_only();

        let (profile, alert) = calc
            .calculate_risk(&student(), "exam went okay", &context, &[], &trajectory)
            .await
            .unwrap();

        assert_eq!(profile.overall_risk, RiskLevel::Low);
        assert!((profile.confidence.value() - 0.5).abs() < 1e-9);
        assert_eq!(
            profile.recommended_action,
            RecommendedAction::ContinueMonitoring
        );
        assert!(!alert.should_alert);
    }

    #[tokio::test]
    async fn contextual_high_severity_maps_to_phq9_estimate() {
        let calc = calculator_with(
            MockGenerator::new()
                .with_response(contextual_json(false, 0.2, "HIGH"))
                .with_response(contextual_json(false, 0.2, "HIGH")),
        );
        let context = MessageContext::empty(student());
        let trajectory = TrajectoryAnalysis::snapshot_only();

        let (profile, _) = calc
            .calculate_risk(&student(), "nothing matters anymore", &context, &[], &trajectory)
            .await
            .unwrap();

        let dep = profile.risk_factors.depression_severity.unwrap();
        assert_eq!(dep.estimated_phq9, 15);
        assert!(dep.is_estimate);
        // 0.8 raw, x0.8 short history, then x0.7 estimate cut.
        assert!((dep.confidence.value() - 0.448).abs() < 1e-9);
        assert_eq!(profile.overall_risk, RiskLevel::High);
    }

    #[tokio::test]
    async fn sleep_and_energy_heuristic_needs_both() {
        let calc = calculator_with(MockGenerator::failing());
        let context = MessageContext::empty(student());
        let trajectory = TrajectoryAnalysis::snapshot_only();

        let (profile, _) = calc
            .calculate_risk(
                &student(),
                "haven't slept much",
                &context,
                &[ConcernIndicator::SleepIssues],
                &trajectory,
            )
            .await
            .unwrap();
        assert!(profile.risk_factors.depression_severity.is_none());

        let (profile, _) = calc
            .calculate_risk(
                &student(),
                "haven't slept much and no energy",
                &context,
                &[ConcernIndicator::SleepIssues, ConcernIndicator::LowEnergy],
                &trajectory,
            )
            .await
            .unwrap();
        let dep = profile.risk_factors.depression_severity.unwrap();
        assert_eq!(dep.estimated_phq9, 11);
        assert!(dep.requires_assessment);
        assert_eq!(profile.overall_risk, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn engagement_drop_grades_behavior_change() {
        let mut context = MessageContext::empty(student());
        context.behavioral.engagement_drop_percentage = 0.65;
        let high = RiskCalculator::assess_behavior_change(&context).unwrap();
        assert_eq!(high.concern, ConcernLevel::High);
        assert!((high.confidence.value() - 0.88).abs() < 1e-9);

        context.behavioral.engagement_drop_percentage = 0.4;
        let medium = RiskCalculator::assess_behavior_change(&context).unwrap();
        assert_eq!(medium.concern, ConcernLevel::Medium);

        context.behavioral.engagement_drop_percentage = 0.2;
        assert!(RiskCalculator::assess_behavior_change(&context).is_none());
    }

    #[tokio::test]
    async fn pre_decision_calm_escalates_to_crisis() {
        let calc = calculator_with(
            MockGenerator::new()
                .with_response(contextual_json(false, 0.2, "LOW"))
                .with_response(contextual_json(false, 0.2, "LOW")),
        );
        let context = MessageContext::empty(student());
        let trajectory = TrajectoryAnalysis {
            patterns: vec![TemporalPattern::PreDecisionCalm],
            velocity: -0.6,
            acceleration: -0.1,
            risk_multiplier: 3.0,
            snapshot_only: false,
        };

        let (profile, _) = calc
            .calculate_risk(&student(), "feeling calm now", &context, &[], &trajectory)
            .await
            .unwrap();

        assert_eq!(profile.overall_risk, RiskLevel::Crisis);
        assert!((profile.confidence.value() - 0.95).abs() < 1e-9);
        assert_eq!(profile.temporal_patterns, vec![TemporalPattern::PreDecisionCalm]);
    }

    #[tokio::test]
    async fn snapshot_only_trajectory_contributes_nothing() {
        let calc = calculator_with(
            MockGenerator::new()
                .with_response(contextual_json(false, 0.2, "LOW"))
                .with_response(contextual_json(false, 0.2, "LOW")),
        );
        let context = MessageContext::empty(student());
        let trajectory = TrajectoryAnalysis {
            patterns: vec![TemporalPattern::PreDecisionCalm],
            velocity: 0.0,
            acceleration: 0.0,
            risk_multiplier: 3.0,
            snapshot_only: true,
        };

        let (profile, _) = calc
            .calculate_risk(&student(), "fine", &context, &[], &trajectory)
            .await
            .unwrap();
        assert_eq!(profile.overall_risk, RiskLevel::Low);
    }

    proptest! {
        // Adding a factor can never lower the fused risk level.
        #[test]
        fn fusion_is_monotone_in_factors(phq9 in 0u8..=27, drop in 0.0f64..1.0) {
            let base = RiskFactors::default();
            let trajectory = TrajectoryAnalysis::snapshot_only();
            let (base_level, _) = RiskCalculator::fuse(&base, &trajectory);

            let mut context = MessageContext::empty(StudentId::new("p").unwrap());
            context.behavioral.engagement_drop_percentage = drop;
            let richer = RiskFactors {
                suicidal_ideation: None,
                depression_severity: Some(DepressionSeverity {
                    estimated_phq9: phq9,
                    confidence: Confidence::clamped(0.5),
                    reason: String::new(),
                    is_estimate: true,
                    requires_assessment: false,
                }),
                behavior_change: RiskCalculator::assess_behavior_change(&context),
            };
            let (level, confidence) = RiskCalculator::fuse(&richer, &trajectory);

            prop_assert!(level >= base_level);
            prop_assert!((0.0..=1.0).contains(&confidence.value()));
        }
    }
}
