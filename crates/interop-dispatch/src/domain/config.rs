//! Channel configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one channel instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Default bound on outbound calls awaiting completion
    pub call_timeout: Duration,
    /// Interval of the expired-pending-call sweep
    pub sweep_interval: Duration,
    /// Largest raw argument payload the codec accepts, in bytes
    pub max_args_bytes: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(10),
            max_args_bytes: 1024 * 1024,
        }
    }
}

impl ChannelConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.call_timeout.as_millis() == 0 {
            return Err(ConfigError::InvalidTimeout(
                "call_timeout cannot be 0".into(),
            ));
        }
        if self.sweep_interval.as_millis() == 0 {
            return Err(ConfigError::InvalidTimeout(
                "sweep_interval cannot be 0".into(),
            ));
        }
        if self.max_args_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_args_bytes cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}
