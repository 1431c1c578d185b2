//! # Log Entities
//!
//! Raw log entries as returned by `eth_getFilterChanges`, and the filter that
//! selects them.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use shared_types::onramp::{data_ready_topic, decode_data_ready};
use shared_types::DataReadyEvent;

use super::errors::WatcherError;

/// Address plus topic0 filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contract.
    pub address: Address,
    /// Accepted values of topic0.
    pub topics: Vec<B256>,
}

impl LogFilter {
    /// `DataReady` logs of one on-ramp contract.
    pub fn data_ready(on_ramp: Address) -> Self {
        Self {
            address: on_ramp,
            topics: vec![data_ready_topic()],
        }
    }
}

/// An EVM log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics, topic0 first.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields.
    pub data: Bytes,
    /// Block containing the log, hex quantity.
    #[serde(default)]
    pub block_number: Option<String>,
    /// Transaction that emitted the log.
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    /// Set when a reorg retracted the log.
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    /// Decode as a `DataReady` event.
    pub fn decode(&self) -> Result<DataReadyEvent, WatcherError> {
        Ok(decode_data_ready(&self.topics, &self.data)?)
    }
}
