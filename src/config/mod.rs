//! Application configuration module
//!
//! Configuration is loaded from environment variables with the
//! `HEALTH_SAATHI` prefix; nested values use double underscores. An optional
//! `health-saathi.toml` next to the binary can carry longer values such as
//! the trigger phrase lists.
//!
//! # Example
//!
//! ```no_run
//! use health_saathi::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod chat;
mod error;
mod server;

pub use ai::AiConfig;
pub use chat::{ChatConfig, FlowOverrides, SessionLifetime};
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use secrecy::Secret;
use serde::Deserialize;

use crate::adapters::ai::GeminiConfig;

/// Unprefixed variable the Gemini key is also read from.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini text-service configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Typing pace, hand-off timings, trigger phrases and session expiry
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// - `HEALTH_SAATHI__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `HEALTH_SAATHI__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key`
    /// - `GEMINI_API_KEY=...` is used when the prefixed key is absent
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut config: AppConfig = config::Config::builder()
            .add_source(config::File::with_name("health-saathi").required(false))
            .add_source(
                config::Environment::default()
                    .prefix("HEALTH_SAATHI")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if !config.ai.has_api_key() {
            if let Ok(key) = std::env::var(GEMINI_API_KEY_VAR) {
                config.ai.gemini_api_key = Some(Secret::new(key));
            }
        }

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate(self.is_production())?;
        self.chat.validate()?;

        let required = self.ai.timeout_secs + self.chat.longest_turn().as_secs_f64().ceil() as u64;
        if self.server.request_timeout_secs < required {
            return Err(ValidationError::RequestTimeoutTooShort {
                configured: self.server.request_timeout_secs,
                required,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Gemini adapter settings derived from the AI section.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig::new(self.ai.gemini_api_key.clone())
            .with_model(self.ai.model.clone())
            .with_base_url(self.ai.base_url.clone())
            .with_timeout(self.ai.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "HEALTH_SAATHI__SERVER__PORT",
        "HEALTH_SAATHI__SERVER__ENVIRONMENT",
        "HEALTH_SAATHI__AI__GEMINI_API_KEY",
        "HEALTH_SAATHI__AI__MODEL",
        "HEALTH_SAATHI__CHAT__EXPLORE__AUTO_ESCALATE_AFTER",
        GEMINI_API_KEY_VAR,
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        clear_env();
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_with_no_variables_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.ai.model, "gemini-1.5-flash-latest");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prefixed_values_override_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("HEALTH_SAATHI__SERVER__PORT", "3000"),
            ("HEALTH_SAATHI__AI__MODEL", "gemini-1.5-pro"),
            ("HEALTH_SAATHI__CHAT__EXPLORE__AUTO_ESCALATE_AFTER", "3"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.gemini().model, "gemini-1.5-pro");
        assert_eq!(config.chat.explore_profile().auto_escalate_after, Some(3));
    }

    #[test]
    fn test_bare_gemini_key_is_picked_up() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[(GEMINI_API_KEY_VAR, "AIza-bare")]).unwrap();

        assert!(config.ai.has_api_key());
        assert!(config.gemini().has_api_key());
    }

    #[test]
    fn test_prefixed_gemini_key_wins() {
        use secrecy::ExposeSecret;

        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("HEALTH_SAATHI__AI__GEMINI_API_KEY", "AIza-prefixed"),
            (GEMINI_API_KEY_VAR, "AIza-bare"),
        ])
        .unwrap();

        let key = config.ai.gemini_api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "AIza-prefixed");
    }

    #[test]
    fn test_request_timeout_must_cover_model_and_hand_off() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = 39;
        assert!(config.validate().is_ok());

        config.server.request_timeout_secs = 38;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::RequestTimeoutTooShort { configured: 38, required: 39 })
        ));

        config.ai.timeout_secs = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_a_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("HEALTH_SAATHI__SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(GEMINI_API_KEY_VAR))
        ));
    }
}
