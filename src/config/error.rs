//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Generator base URL must be http(s)")]
    InvalidGeneratorUrl,

    #[error("Risk confidence threshold must be between 0 and 1")]
    InvalidConfidenceThreshold,

    #[error("Checkpoint interval must be at least 1 day")]
    InvalidCheckpointInterval,

    #[error("C-SSRS thresholds must lie within the 0-5 score range")]
    InvalidCssrsThreshold,
}
