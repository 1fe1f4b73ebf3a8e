//! Mock text generator for testing.
//!
//! Queues canned responses consumed in order, tracks prompts for
//! verification, and can be switched to fail every call.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::{GenerationError, TextGenerator};

/// Configurable mock implementation of the TextGenerator port.
///
/// An exhausted response queue yields `GenerationError::Unavailable`, so
/// callers exercise their degraded paths rather than hanging on a default.
#[derive(Default)]
pub struct MockGenerator {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    fail_all: bool,
}

impl MockGenerator {
    /// Creates a mock with an empty response queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock where every call fails with a retryable error.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Queues a response; responses are consumed in insertion order.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(response.into());
        self
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// All prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.fail_all {
            return Err(GenerationError::Unavailable(
                "mock configured to fail".to_string(),
            ));
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GenerationError::Unavailable("no queued response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_are_consumed_in_order() {
        let generator = MockGenerator::new()
            .with_response("first")
            .with_response("second");

        assert_eq!(generator.generate("a", 10).await.unwrap(), "first");
        assert_eq!(generator.generate("b", 10).await.unwrap(), "second");
        assert!(generator.generate("c", 10).await.is_err());
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_mock_always_errors() {
        let generator = MockGenerator::failing();
        let err = generator.generate("x", 10).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn prompts_are_recorded() {
        let generator = MockGenerator::new().with_response("ok");
        generator.generate("hello prompt", 10).await.unwrap();
        assert_eq!(generator.prompts(), vec!["hello prompt".to_string()]);
    }
}
