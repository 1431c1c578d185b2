//! # Placement
//!
//! Larger pieces go first; ties keep their input order. Each piece starts at
//! the next offset aligned to its own size. Because sizes are powers of two
//! and descend, alignment never leaves a gap, and the resulting layout
//! depends only on the multiset of sizes.

use shared_types::PaddedPieceSize;

use crate::domain::{
    index_start_offset, max_index_entries, DataSegmentError, Location, Placement,
};

/// Lay pieces out back to back.
pub fn compute_placement(sizes: &[PaddedPieceSize]) -> Placement {
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    // Stable sort keeps equal sizes in input order.
    order.sort_by(|a, b| sizes[*b].cmp(&sizes[*a]));

    let mut placed = Vec::with_capacity(sizes.len());
    let mut offset = 0u64;
    for &i in &order {
        let size = sizes[i];
        offset = align_up(offset, size.get());
        placed.push((i, Location { offset, size }));
        offset += size.get();
    }
    placed.sort_unstable_by_key(|(i, _)| *i);
    let locations = placed.into_iter().map(|(_, location)| location).collect();

    Placement {
        locations,
        order,
        total: offset,
    }
}

fn align_up(offset: u64, alignment: u64) -> u64 {
    offset.div_ceil(alignment) * alignment
}

/// Place pieces and check the layout leaves room for the deal's index.
pub fn check_fit(
    deal_size: PaddedPieceSize,
    sizes: &[PaddedPieceSize],
) -> Result<Placement, DataSegmentError> {
    let max_entries = max_index_entries(deal_size);
    if sizes.len() as u64 > max_entries {
        return Err(DataSegmentError::TooManyPieces {
            count: sizes.len(),
            max: max_entries,
        });
    }

    let placement = compute_placement(sizes);
    let index_start = index_start_offset(deal_size);
    if placement.total > index_start {
        return Err(DataSegmentError::DoesNotFit {
            end: placement.total,
            index_start,
        });
    }
    Ok(placement)
}
