//! Aggregation engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{PaddedPieceSize, TargetDealSize};

use super::errors::EngineError;

/// Batching thresholds and local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Initial target deal size (padded bytes, power of two)
    pub target_deal_size: u64,
    /// Batches whose next size stays at or below this keep accumulating (padded bytes)
    pub min_deal_size: u64,
    /// Capacity of the watcher to engine queue
    pub queue_capacity: usize,
    /// Directory aggregates are materialized into
    pub data_dir: PathBuf,
    /// Interval between commit receipt polls (in milliseconds)
    pub receipt_poll_interval_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            target_deal_size: 256 << 20,
            min_deal_size: 256 << 20,
            queue_capacity: 1024,
            data_dir: PathBuf::from("./data/aggregates"),
            receipt_poll_interval_ms: 2_000,
        }
    }
}

impl AggregationConfig {
    /// Receipt poll interval.
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Shared target deal size seeded from this configuration.
    pub fn target(&self) -> Result<TargetDealSize, EngineError> {
        let initial = PaddedPieceSize::new(self.target_deal_size)
            .map_err(|e| EngineError::Config(format!("target_deal_size: {}", e)))?;
        let minimum = PaddedPieceSize::new(self.min_deal_size)
            .map_err(|e| EngineError::Config(format!("min_deal_size: {}", e)))?;
        Ok(TargetDealSize::new(initial, minimum))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.target()?;
        if self.min_deal_size > self.target_deal_size {
            return Err(EngineError::Config(
                "min_deal_size must not exceed target_deal_size".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(EngineError::Config("queue_capacity must be > 0".into()));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(EngineError::Config("data_dir must be set".into()));
        }
        Ok(())
    }
}

/// Remote store for materialized aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Upload API base URL
    pub endpoint: String,
    /// Public gateway base URL for retrieval links
    pub gateway: String,
    /// Disable to serve aggregates only from the transfer server
    pub enabled: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://node.lighthouse.storage".to_string(),
            gateway: "https://gateway.lighthouse.storage".to_string(),
            enabled: true,
        }
    }
}

impl UploadConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.enabled && (self.endpoint.is_empty() || self.gateway.is_empty()) {
            return Err(EngineError::Config(
                "upload endpoint and gateway must be set".into(),
            ));
        }
        Ok(())
    }
}
