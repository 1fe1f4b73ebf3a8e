//! Port for the language-model text generator.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a text generator can surface.
///
/// Generation failures are recoverable: callers fall back to a safe canned
/// reply or a conservative analysis rather than failing the message.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider returned malformed payload: {0}")]
    MalformedResponse(String),

    #[error("authentication failed")]
    AuthenticationFailed,
}

impl GenerationError {
    /// Whether a retry with the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Unavailable(_)
                | GenerationError::Timeout { .. }
                | GenerationError::RateLimited
        )
    }
}

/// Abstraction over the language model used for reply generation and
/// contextual analysis.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for the prompt, bounded by `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_are_retryable() {
        assert!(GenerationError::Unavailable("502".into()).is_retryable());
        assert!(GenerationError::Timeout { seconds: 30 }.is_retryable());
        assert!(GenerationError::RateLimited.is_retryable());
    }

    #[test]
    fn request_errors_are_not_retryable() {
        assert!(!GenerationError::InvalidRequest("empty prompt".into()).is_retryable());
        assert!(!GenerationError::AuthenticationFailed.is_retryable());
        assert!(!GenerationError::MalformedResponse("not json".into()).is_retryable());
    }
}
