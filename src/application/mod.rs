//! Application layer: the checkpoint pipeline and its supporting services.

pub mod adaptive_sensitivity;
pub mod concern_extractor;
pub mod emoji_interpreter;
pub mod hybrid_assessment;
pub mod processor;
pub mod prompts;
pub mod risk_calculator;
pub mod temporal_analyzer;

pub use adaptive_sensitivity::AdaptiveSensitivity;
pub use concern_extractor::ConcernExtractor;
pub use emoji_interpreter::EmojiInterpreter;
pub use hybrid_assessment::HybridAssessment;
pub use processor::{PipelineError, SequentialProcessor};
pub use risk_calculator::RiskCalculator;
pub use temporal_analyzer::TemporalAnalyzer;
