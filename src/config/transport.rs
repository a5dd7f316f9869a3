//! Transport configuration

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;

/// Persistent connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Base WebSocket URL (identity query parameters are appended per connect)
    pub url: String,

    /// Upper bound for a single connect attempt, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Frames buffered while reconnecting (0 disables buffering)
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

impl TransportConfig {
    /// Parsed base URL
    pub fn parsed_url(&self) -> Result<Url, ValidationError> {
        Url::parse(&self.url).map_err(|e| ValidationError::InvalidTransportUrl(e.to_string()))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate transport configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("SUPPORT_REALTIME__TRANSPORT__URL"));
        }
        let url = self.parsed_url()?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ValidationError::UnsupportedScheme);
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.outbox_capacity > 10_000 {
            return Err(ValidationError::OutboxTooLarge);
        }
        Ok(())
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_outbox_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> TransportConfig {
        TransportConfig {
            url: url.to_string(),
            connect_timeout_secs: default_connect_timeout(),
            outbox_capacity: default_outbox_capacity(),
        }
    }

    #[test]
    fn test_valid_websocket_urls() {
        assert!(config("ws://localhost:4000/ws").validate().is_ok());
        assert!(config("wss://realtime.example.com/ws").validate().is_ok());
    }

    #[test]
    fn test_rejects_http_scheme() {
        assert!(matches!(
            config("https://example.com").validate(),
            Err(ValidationError::UnsupportedScheme)
        ));
    }

    #[test]
    fn test_rejects_garbage_url() {
        assert!(matches!(
            config("not a url").validate(),
            Err(ValidationError::InvalidTransportUrl(_))
        ));
        assert!(matches!(
            config("").validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_timeout_bounds() {
        let mut cfg = config("ws://localhost/ws");
        cfg.connect_timeout_secs = 0;
        assert!(cfg.validate().is_err());
        cfg.connect_timeout_secs = 500;
        assert!(cfg.validate().is_err());
        cfg.connect_timeout_secs = 5;
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
    }
}
