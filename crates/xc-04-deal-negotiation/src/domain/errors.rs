//! # Domain Errors
//!
//! Error types for deal negotiation. Every variant is non-fatal to the
//! bridge: the aggregation engine logs it and moves on.

use shared_rpc::RpcError;
use thiserror::Error;

/// Deal negotiation error types.
#[derive(Debug, Error)]
pub enum DealError {
    /// The provider answered with `Accepted = false`.
    #[error("deal proposal rejected: {0}")]
    Rejected(String),

    /// The provider does not speak the deal protocol version we use.
    #[error("provider {peer} does not support protocol version 1.2.0")]
    UnsupportedProtocol {
        /// Provider peer id.
        peer: String,
    },

    /// The provider's on-chain registration is unusable.
    #[error("provider info error: {0}")]
    ProviderInfo(String),

    /// Destination chain query failed.
    #[error("destination chain error: {0}")]
    Chain(#[from] RpcError),

    /// Dialing or stream failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request could not be encoded or response decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An address in the configuration or proposal is malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Shutdown interrupted the round trip.
    #[error("deal negotiation cancelled")]
    Cancelled,

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DealError {
    /// Outcome label for the deal proposal counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::UnsupportedProtocol { .. } => "unsupported",
            Self::Cancelled => "cancelled",
            _ => "error",
        }
    }
}
