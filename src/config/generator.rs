//! Text generator configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the text-generation collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorSettings {
    /// API key for the configured endpoint.
    pub api_key: Option<String>,

    /// Model to request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl GeneratorSettings {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate generator configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("GENERATOR__API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGeneratorUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.max_retries, 2);
    }

    #[test]
    fn validation_requires_api_key() {
        let settings = GeneratorSettings::default();
        assert!(settings.validate().is_err());

        let settings = GeneratorSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_url() {
        let settings = GeneratorSettings {
            api_key: Some("sk-test".to_string()),
            base_url: "ftp://nope".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::InvalidGeneratorUrl)
        ));
    }
}
