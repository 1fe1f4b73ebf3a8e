//! Ports: trait boundaries between the application core and the outside
//! world. Adapters implement these; the application depends only on the
//! traits.

pub mod repository;
pub mod text_generator;

pub use repository::{
    AlertRecord, AlertStatus, AiAccuracy, FeedbackRecord, FeedbackSeverity, PersistenceError,
    StudentRepository, ThresholdCalibrationRecord,
};
pub use text_generator::{GenerationError, TextGenerator};
