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

    #[error("Invalid WebSocket URL: {0}")]
    InvalidTransportUrl(String),

    #[error("WebSocket URL must use ws:// or wss://")]
    UnsupportedScheme,

    #[error("Invalid connect timeout")]
    InvalidTimeout,

    #[error("Outbox capacity exceeds maximum allowed (10000)")]
    OutboxTooLarge,

    #[error("Reconnect initial delay exceeds max delay")]
    InvalidBackoffRange,

    #[error("Reconnect delays must be non-zero")]
    ZeroBackoffDelay,

    #[error("Reconnect multiplier must be a finite number >= 1.0")]
    InvalidMultiplier,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Invalid session identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),
}
