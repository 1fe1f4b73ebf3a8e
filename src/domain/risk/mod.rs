//! Risk domain: levels, factors, profiles, and alert recommendations.

mod factors;
mod level;
mod profile;

pub use factors::{
    BehaviorChange, ConcernLevel, DepressionSeverity, RiskFactors, SuicidalIdeation,
};
pub use level::{Confidence, RiskLevel};
pub use profile::{
    AlertRecommendation, AlertType, RecommendedAction, RiskProfile, TemporalPattern,
};
