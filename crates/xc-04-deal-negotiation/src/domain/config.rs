//! Deal negotiation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::address::FilecoinAddress;
use super::errors::DealError;

/// Deal terms and provider selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealConfig {
    /// Storage provider actor, `f0…`
    pub provider_address: String,
    /// Epochs between the current head and the deal start
    pub delay_epochs: i64,
    /// Deal length in epochs
    pub duration_epochs: i64,
    /// Upper bound on one proposal round trip (in seconds)
    pub request_timeout_secs: u64,
    /// Largest provider response accepted (in bytes)
    pub max_response_bytes: u64,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            provider_address: String::new(),
            delay_epochs: 3_000,
            duration_epochs: 518_400,
            request_timeout_secs: 60,
            max_response_bytes: 64 * 1024,
        }
    }
}

impl DealConfig {
    /// Round-trip timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parsed provider address.
    pub fn provider(&self) -> Result<FilecoinAddress, DealError> {
        FilecoinAddress::parse_id(&self.provider_address)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), DealError> {
        self.provider()
            .map_err(|e| DealError::Config(format!("provider_address: {}", e)))?;
        if self.delay_epochs < 0 {
            return Err(DealError::Config("delay_epochs must be >= 0".into()));
        }
        if self.duration_epochs <= 0 {
            return Err(DealError::Config("duration_epochs must be > 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(DealError::Config("request_timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DealConfig {
        DealConfig {
            provider_address: "t01000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_need_a_provider() {
        assert!(DealConfig::default().validate().is_err());
        assert!(config().validate().is_ok());
        assert_eq!(config().provider().unwrap(), FilecoinAddress::Id(1000));
    }

    #[test]
    fn test_invalid_epochs() {
        let mut bad = config();
        bad.duration_epochs = 0;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.delay_epochs = -1;
        assert!(bad.validate().is_err());
    }
}
