//! # XC-01 Data Segment
//!
//! Deterministic aggregation of padded pieces into a single deal-sized piece.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (domain + algorithms)
//!
//! ## Purpose
//!
//! - Lay out pieces inside a deal so identical size multisets always yield
//!   identical layouts
//! - Build the aggregate merkle tree (pieces plus an index of descriptors)
//! - Produce per-piece inclusion proofs against the aggregate commitment
//! - Reconstruct the aggregate payload as a byte stream from piece sources
//!
//! ## Layout Rules
//!
//! | Rule | Value |
//! |------|-------|
//! | Node hash | sha256, top two bits cleared |
//! | Index entry | 64 padded bytes |
//! | Index capacity | `max(4, nextPow2(deal / 2048 / 64))` entries |
//! | Next deal size | `nextPow2(total + 256)`, strictly greater |
//!
//! ## Module Structure
//!
//! ```text
//! xc-01-data-segment/
//! ├── domain/          # Aggregate, Placement, SegmentDescriptor, proofs, errors
//! └── algorithms/      # merkle, placement, fr32, commitment, stream
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

// Re-exports
pub use algorithms::{
    check_fit, compute_piece_commitment, compute_piece_root, compute_placement, hash_pair,
    zero_commitment, ByteStream, SparseTree,
};
pub use domain::{
    index_start_offset, max_index_entries, next_deal_size, unpadded_len, Aggregate,
    DataSegmentError, InclusionProof, Location, Node, Placement, ProofData, SegmentDescriptor,
    ENTRY_SIZE, LAYOUT_OVERHEAD, MIN_INDEX_ENTRIES,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
