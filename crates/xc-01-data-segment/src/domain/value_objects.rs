//! # Value Objects
//!
//! Layout constants and deal-size arithmetic.

use shared_types::PaddedPieceSize;

use super::errors::DataSegmentError;

/// A merkle node.
pub type Node = [u8; 32];

/// Padded bytes of one index entry (two nodes).
pub const ENTRY_SIZE: u64 = 64;

/// Fixed overhead added to the packed size before choosing the next deal size.
pub const LAYOUT_OVERHEAD: u64 = 256;

/// Minimum number of index entries in any deal.
pub const MIN_INDEX_ENTRIES: u64 = 4;

/// Index capacity of a deal: one entry per 128 KiB, rounded up to a power
/// of two, never fewer than [`MIN_INDEX_ENTRIES`].
pub fn max_index_entries(deal_size: PaddedPieceSize) -> u64 {
    (deal_size.get() / 2048 / ENTRY_SIZE)
        .next_power_of_two()
        .max(MIN_INDEX_ENTRIES)
}

/// Padded offset at which the index region starts (it runs to the end of the deal).
///
/// Deals too small to hold their own index report an index start of zero,
/// so nothing fits in them.
pub fn index_start_offset(deal_size: PaddedPieceSize) -> u64 {
    deal_size
        .get()
        .saturating_sub(max_index_entries(deal_size) * ENTRY_SIZE)
}

/// Payload bytes corresponding to a 128-aligned padded length.
pub fn unpadded_len(padded: u64) -> u64 {
    padded - padded / 128
}

/// Smallest power of two strictly greater than `total + LAYOUT_OVERHEAD`.
pub fn next_deal_size(total: u64) -> Result<PaddedPieceSize, DataSegmentError> {
    let with_overhead = total
        .checked_add(LAYOUT_OVERHEAD)
        .ok_or(DataSegmentError::SizeOverflow(total))?;
    let bits = 64 - with_overhead.leading_zeros();
    let next = 1u64
        .checked_shl(bits)
        .ok_or(DataSegmentError::SizeOverflow(total))?;
    Ok(PaddedPieceSize::new(next)?)
}
