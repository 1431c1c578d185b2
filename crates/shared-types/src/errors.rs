//! # Error Types
//!
//! Validation errors for shared entities.

use thiserror::Error;

/// Errors raised while validating shared entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Size is not a power of two or is below the 128-byte minimum.
    #[error("Invalid padded piece size: {0}")]
    InvalidPieceSize(u64),

    /// Commitment bytes are not a piece-commitment CID.
    #[error("Invalid piece commitment: {0}")]
    InvalidCommitment(String),

    /// Log entry does not decode as a `DataReady` event.
    #[error("Invalid DataReady event: {0}")]
    InvalidEvent(String),
}
