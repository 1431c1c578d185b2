//! # Domain Errors
//!
//! Error types for the transfer registry and server.

use shared_types::TransferId;
use thiserror::Error;
use xc_01_data_segment::DataSegmentError;

/// Transfer server error types.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Request carried no `id` parameter.
    #[error("ID is required")]
    MissingId,

    /// `id` was not an integer.
    #[error("Invalid ID")]
    InvalidId(String),

    /// No transfer registered under the id.
    #[error("No data found")]
    NotFound(TransferId),

    /// Piece bytes could not be fetched.
    #[error("Piece source error: {0}")]
    Source(String),

    /// Aggregate reconstruction failed.
    #[error("Aggregate error: {0}")]
    Aggregate(#[from] DataSegmentError),

    /// Listener or server failure.
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TransferError {
    /// True for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingId | Self::InvalidId(_) | Self::NotFound(_))
    }
}
