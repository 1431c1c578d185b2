//! # Domain Errors
//!
//! Error types for log ingestion, plus the single place that decides which
//! of them are worth a reconnect.

use shared_rpc::RpcError;
use shared_types::TypeError;
use thiserror::Error;

/// Message fragments of network read failures that only need a reconnect.
const TRANSIENT_PATTERNS: &[&str] = &[
    "read tcp",
    "connection reset",
    "broken pipe",
    "filter not found",
];

/// Event watcher error types.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Source-chain RPC failure.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// A log that does not decode as `DataReady`.
    #[error("Failed to decode log: {0}")]
    Decode(#[from] TypeError),

    /// The subscription itself failed.
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WatcherError {
    /// True when the subscription should be re-established rather than the
    /// process stopped.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Decode(_) | Self::Config(_) => false,
            Self::Rpc(e) if e.is_transport() => true,
            _ => {
                let message = self.to_string().to_lowercase();
                TRANSIENT_PATTERNS.iter().any(|p| message.contains(p))
            }
        }
    }
}
