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

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid host address")]
    InvalidHost,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Request timeout of {configured}s is shorter than the {required}s a scripted turn can take")]
    RequestTimeoutTooShort { configured: u64, required: u64 },

    #[error("Invalid AI base URL: must start with http:// or https://")]
    InvalidAiBaseUrl,

    #[error("AI model name cannot be empty")]
    EmptyModel,

    #[error("Typing delay minimum exceeds maximum")]
    InvalidTypingBounds,

    #[error("Chat setting out of range: {0}")]
    ChatSettingOutOfRange(&'static str),
}
