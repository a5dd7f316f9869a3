//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SUPPORT_REALTIME_` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use support_realtime::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Connecting to {}", config.transport.url);
//! ```

mod error;
mod logging;
mod reconnect;
mod session;
mod transport;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use reconnect::ReconnectConfig;
pub use session::SessionConfig;
pub use transport::TransportConfig;

use serde::Deserialize;

use crate::adapters::websocket::TransportOptions;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Persistent connection settings (URL, timeouts, outbox)
    pub transport: TransportConfig,

    /// Reconnect backoff
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Tracing subscriber settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Identity and topics for the command-line client
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUPPORT_REALTIME` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SUPPORT_REALTIME__TRANSPORT__URL=wss://...` -> `transport.url = wss://...`
    /// - `SUPPORT_REALTIME__RECONNECT__MAX_ATTEMPTS=10` -> `reconnect.max_attempts = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUPPORT_REALTIME")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.transport.validate()?;
        self.reconnect.validate()?;
        self.logging.validate()?;
        if let Some(session) = &self.session {
            session.validate()?;
        }
        Ok(())
    }

    /// Transport settings assembled from the transport and reconnect sections
    pub fn transport_options(&self) -> Result<TransportOptions, ValidationError> {
        Ok(TransportOptions::new(self.transport.parsed_url()?)
            .with_connect_timeout(self.transport.connect_timeout())
            .with_outbox_capacity(self.transport.outbox_capacity)
            .with_reconnect(self.reconnect.policy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::realtime::Role;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("SUPPORT_REALTIME__TRANSPORT__URL", "ws://localhost:4000/ws");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for key in [
            "SUPPORT_REALTIME__TRANSPORT__URL",
            "SUPPORT_REALTIME__TRANSPORT__CONNECT_TIMEOUT_SECS",
            "SUPPORT_REALTIME__RECONNECT__MAX_ATTEMPTS",
            "SUPPORT_REALTIME__RECONNECT__MULTIPLIER",
            "SUPPORT_REALTIME__LOGGING__FORMAT",
            "SUPPORT_REALTIME__SESSION__ID",
            "SUPPORT_REALTIME__SESSION__ROLE",
            "SUPPORT_REALTIME__SESSION__TENANT",
            "SUPPORT_REALTIME__SESSION__TOPICS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.transport.url, "ws://localhost:4000/ws");
        assert_eq!(config.transport.connect_timeout_secs, 10);
        assert_eq!(config.reconnect.max_attempts, 0);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.session.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_url_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUPPORT_REALTIME__TRANSPORT__CONNECT_TIMEOUT_SECS", "3");
        env::set_var("SUPPORT_REALTIME__RECONNECT__MAX_ATTEMPTS", "5");
        env::set_var("SUPPORT_REALTIME__RECONNECT__MULTIPLIER", "1.5");
        env::set_var("SUPPORT_REALTIME__LOGGING__FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let options = config.transport_options().unwrap();
        assert_eq!(options.connect_timeout, Duration::from_secs(3));
        assert_eq!(options.reconnect.max_attempts, 5);
        assert_eq!(options.reconnect.multiplier, 1.5);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_session_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUPPORT_REALTIME__SESSION__ID", "u1");
        env::set_var("SUPPORT_REALTIME__SESSION__ROLE", "contact");
        env::set_var("SUPPORT_REALTIME__SESSION__TENANT", "t1");
        env::set_var("SUPPORT_REALTIME__SESSION__TOPICS", "conversation:c1");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let session = config.session.as_ref().unwrap();
        assert_eq!(session.role, Role::Contact);
        assert_eq!(session.identity().unwrap().tenant(), "t1");
        assert_eq!(session.topic_list().unwrap().len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_http_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SUPPORT_REALTIME__TRANSPORT__URL", "http://localhost:4000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnsupportedScheme)
        ));
    }
}
