//! # Target Deal Size
//!
//! The padded size new aggregates are built to. It starts at the larger of
//! the configured target and minimum, only ever grows, and is always a
//! power of two.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::PaddedPieceSize;

/// Shared handle to the current target deal size.
///
/// Clones observe the same value. The aggregation engine is the only caller
/// of [`TargetDealSize::grow_to`]; everyone else reads.
#[derive(Debug, Clone)]
pub struct TargetDealSize {
    current: Arc<AtomicU64>,
    minimum: PaddedPieceSize,
}

impl TargetDealSize {
    /// Start at `max(initial, minimum)`.
    pub fn new(initial: PaddedPieceSize, minimum: PaddedPieceSize) -> Self {
        Self {
            current: Arc::new(AtomicU64::new(initial.max(minimum).get())),
            minimum,
        }
    }

    /// Current target.
    pub fn get(&self) -> PaddedPieceSize {
        // Only validated sizes are ever stored.
        PaddedPieceSize::new(self.current.load(Ordering::Acquire)).unwrap_or(self.minimum)
    }

    /// Configured minimum; batches whose next size stays at or below it keep accumulating.
    pub fn minimum(&self) -> PaddedPieceSize {
        self.minimum
    }

    /// Raise the target to `candidate` if larger. Returns the resulting target.
    pub fn grow_to(&self, candidate: PaddedPieceSize) -> PaddedPieceSize {
        let previous = self.current.fetch_max(candidate.get(), Ordering::AcqRel);
        PaddedPieceSize::new(previous.max(candidate.get())).unwrap_or(candidate)
    }
}
