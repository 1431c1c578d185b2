//! Algorithms: merkle hashing, placement, fr32 padding and byte streams.

pub mod commitment;
pub mod fr32;
pub mod merkle;
pub mod placement;
pub mod stream;

pub use commitment::{compute_piece_commitment, compute_piece_root};
pub use merkle::{hash_pair, zero_commitment, SparseTree};
pub use placement::{check_fit, compute_placement};
pub use stream::ByteStream;
