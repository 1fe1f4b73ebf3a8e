//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the `HAVEN_`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use haven_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod generator;
mod monitoring;

pub use error::{ConfigError, ValidationError};
pub use generator::GeneratorSettings;
pub use monitoring::MonitoringSettings;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Text generator configuration (endpoint, model, key)
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Monitoring thresholds and schedules
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables with the `HAVEN`
    /// prefix; `__` separates nested values.
    ///
    /// # Environment Variable Format
    ///
    /// - `HAVEN__GENERATOR__API_KEY=sk-...` -> `generator.api_key`
    /// - `HAVEN__MONITORING__CHECKPOINT_INTERVAL_DAYS=14`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("HAVEN").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.generator.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}
