//! Dense piece commitment over payload bytes.

use shared_types::{PaddedPieceSize, PieceCommitment};

use super::fr32;
use super::merkle::root_of_leaves;
use crate::domain::{DataSegmentError, Node};

/// Merkle root of a piece whose payload is `data`, zero-filled up to `size`.
///
/// Holds the whole padded piece in memory; meant for small pieces and
/// verification.
pub fn compute_piece_root(data: &[u8], size: PaddedPieceSize) -> Result<Node, DataSegmentError> {
    let capacity = size.unpadded();
    if data.len() as u64 > capacity {
        return Err(DataSegmentError::DoesNotFit {
            end: data.len() as u64,
            index_start: capacity,
        });
    }

    let mut payload = data.to_vec();
    payload.resize(capacity as usize, 0);
    let padded = fr32::pad(&payload);

    let leaves: Vec<Node> = padded
        .chunks_exact(32)
        .map(|chunk| {
            let mut node = [0u8; 32];
            node.copy_from_slice(chunk);
            node
        })
        .collect();
    Ok(root_of_leaves(&leaves))
}

/// [`compute_piece_root`] wrapped as a commitment CID.
pub fn compute_piece_commitment(
    data: &[u8],
    size: PaddedPieceSize,
) -> Result<PieceCommitment, DataSegmentError> {
    Ok(PieceCommitment::from_node(compute_piece_root(data, size)?)?)
}
