//! Event watcher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::WatcherError;

/// Polling and reconnect timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Interval between `eth_getFilterChanges` polls (in milliseconds)
    pub poll_interval_ms: u64,
    /// Pause before re-subscribing after a transient failure (in milliseconds)
    pub reconnect_delay_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            reconnect_delay_ms: 1_000,
        }
    }
}

impl WatcherConfig {
    /// Poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reconnect delay.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), WatcherError> {
        if self.poll_interval_ms == 0 {
            return Err(WatcherError::Config("poll_interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WatcherConfig::default();
        assert_eq!(config.reconnect_delay(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let config = WatcherConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
