//! # Domain Errors
//!
//! Error types for aggregate construction and proving.

use shared_types::TypeError;
use thiserror::Error;

/// Data segment error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSegmentError {
    /// An aggregate needs at least one piece.
    #[error("No pieces to aggregate")]
    NoPieces,

    /// More pieces than index entries available in the deal.
    #[error("Too many pieces for deal: {count} > {max}")]
    TooManyPieces {
        /// Pieces requested
        count: usize,
        /// Index capacity of the deal
        max: u64,
    },

    /// Placed pieces run into the index region.
    #[error("Pieces do not fit: placement ends at {end}, index starts at {index_start}")]
    DoesNotFit {
        /// End of the placement in padded bytes
        end: u64,
        /// Start of the index region in padded bytes
        index_start: u64,
    },

    /// Piece position out of range.
    #[error("Piece {0} is not part of the aggregate")]
    UnknownPiece(usize),

    /// A generated proof did not reproduce the aggregate root.
    #[error("Inclusion proof for piece {0} does not verify")]
    ProofMismatch(usize),

    /// Number of byte sources differs from number of pieces.
    #[error("Expected {expected} piece sources, got {got}")]
    SourceCountMismatch {
        /// Pieces in the aggregate
        expected: usize,
        /// Sources supplied
        got: usize,
    },

    /// Next deal size would overflow 64 bits.
    #[error("Deal size overflow for {0} bytes")]
    SizeOverflow(u64),

    /// Invalid size or commitment.
    #[error(transparent)]
    Type(#[from] TypeError),
}
