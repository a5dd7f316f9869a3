//! Reconnect backoff configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::realtime::ReconnectPolicy;

/// Capped exponential backoff settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries, in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Growth factor between retries (1.0 = fixed interval)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Retries before the connection is reported lost (0 = never give up)
    #[serde(default)]
    pub max_attempts: u32,
}

impl ReconnectConfig {
    /// Domain policy for these settings
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
        }
    }

    /// Validate backoff configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.initial_delay_ms == 0 || self.max_delay_ms == 0 {
            return Err(ValidationError::ZeroBackoffDelay);
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ValidationError::InvalidBackoffRange);
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ValidationError::InvalidMultiplier);
        }
        Ok(())
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            max_attempts: 0,
        }
    }
}

fn default_initial_delay() -> u64 {
    1_000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}
