//! # Domain Errors
//!
//! Error types for the aggregation engine.
//!
//! Everything returned from [`crate::AggregationEngine::run`] is fatal and
//! tears down the node. Deal failures are the exception: they surface as
//! [`EngineError::Deal`] from the deal port, get logged, and the engine
//! carries on.

use shared_rpc::RpcError;
use thiserror::Error;
use xc_01_data_segment::DataSegmentError;

/// Aggregation engine error types.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The pending batch could not be built into an aggregate.
    #[error("failed to create aggregate from pending batch: {0}")]
    Aggregate(#[from] DataSegmentError),

    /// The commit transaction could not be built, sent or mined.
    #[error("commit transaction failed: {0}")]
    Commit(String),

    /// Source chain RPC failure during commit.
    #[error("source chain error: {0}")]
    Rpc(#[from] RpcError),

    /// Transaction signing failed.
    #[error("signer error: {0}")]
    Signer(String),

    /// Writing the aggregate to local storage failed.
    #[error("failed to save aggregate to file: {0}")]
    Materialize(String),

    /// Uploading the aggregate to the remote store failed.
    #[error("failed to upload aggregate: {0}")]
    Upload(String),

    /// Deal proposal failed. Never fatal.
    #[error("failed to send deal: {0}")]
    Deal(String),

    /// Shutdown interrupted a blocking step.
    #[error("aggregation cancelled")]
    Cancelled,

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// Whether this error must stop the node.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Deal(_) | Self::Cancelled)
    }
}
