//! # Domain Entities
//!
//! Placement results, index entries and merkle proofs.

use sha2::{Digest, Sha256};
use shared_types::PaddedPieceSize;

use super::value_objects::{Node, ENTRY_SIZE};
use crate::algorithms::merkle::{hash_pair, truncate};

/// Where one piece lives inside a deal, in padded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Padded byte offset, aligned to `size`.
    pub offset: u64,
    /// Padded piece size.
    pub size: PaddedPieceSize,
}

impl Location {
    /// First padded byte after the piece.
    pub fn end(&self) -> u64 {
        self.offset + self.size.get()
    }

    /// Position of the piece's subtree root at its own tree level.
    pub fn subtree_index(&self) -> u64 {
        self.offset / self.size.get()
    }
}

/// Deterministic layout of a set of pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Locations in the order the pieces were supplied.
    pub locations: Vec<Location>,
    /// Piece positions in layout order (ascending offset).
    pub order: Vec<usize>,
    /// Padded bytes covered by the layout.
    pub total: u64,
}

impl Placement {
    /// Number of placed pieces.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// One index entry: a piece's commitment plus its location and a checksum.
///
/// Serialized as two nodes. The second node is
/// `offset (u64 LE) ‖ size (u64 LE) ‖ checksum (16 bytes)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    /// Piece commitment.
    pub commitment: Node,
    /// Padded byte offset.
    pub offset: u64,
    /// Padded byte size.
    pub size: u64,
    /// Truncated sha256 over the other fields.
    pub checksum: [u8; 16],
}

impl SegmentDescriptor {
    /// Build an entry and compute its checksum.
    pub fn new(commitment: Node, location: Location) -> Self {
        let mut entry = Self {
            commitment,
            offset: location.offset,
            size: location.size.get(),
            checksum: [0u8; 16],
        };
        entry.checksum = entry.compute_checksum();
        entry
    }

    fn compute_checksum(&self) -> [u8; 16] {
        let mut hasher = Sha256::new();
        hasher.update(self.commitment);
        hasher.update(self.offset.to_le_bytes());
        hasher.update(self.size.to_le_bytes());
        hasher.update([0u8; 16]);
        let digest = hasher.finalize();

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&digest[..16]);
        checksum[15] &= 0b0011_1111;
        checksum
    }

    /// Checksum matches the other fields.
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// The two leaf nodes of the entry.
    pub fn to_nodes(&self) -> [Node; 2] {
        let mut second = [0u8; 32];
        second[..8].copy_from_slice(&self.offset.to_le_bytes());
        second[8..16].copy_from_slice(&self.size.to_le_bytes());
        second[16..].copy_from_slice(&self.checksum);
        truncate(&mut second);
        [self.commitment, second]
    }

    /// Padded serialization.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE as usize] {
        let [first, second] = self.to_nodes();
        let mut out = [0u8; ENTRY_SIZE as usize];
        out[..32].copy_from_slice(&first);
        out[32..].copy_from_slice(&second);
        out
    }

    /// Merkle node covering the whole entry.
    pub fn node(&self) -> Node {
        let [first, second] = self.to_nodes();
        hash_pair(&first, &second)
    }
}

/// A merkle path from a node to a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofData {
    /// Position of the proven node at its own level.
    pub index: u64,
    /// Siblings, bottom up.
    pub path: Vec<Node>,
}

impl ProofData {
    /// Fold the path over `leaf`.
    pub fn compute_root(&self, leaf: &Node) -> Node {
        let mut node = *leaf;
        let mut index = self.index;
        for sibling in &self.path {
            node = if index & 1 == 1 {
                hash_pair(sibling, &node)
            } else {
                hash_pair(&node, sibling)
            };
            index >>= 1;
        }
        node
    }

    /// True when the path leads from `leaf` to `root`.
    pub fn verify(&self, leaf: &Node, root: &Node) -> bool {
        self.compute_root(leaf) == *root
    }
}

/// Proof that a piece sits in an aggregate and is listed in its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    /// Path from the piece's subtree root to the aggregate root.
    pub subtree: ProofData,
    /// Path from the piece's index entry to the aggregate root.
    pub index: ProofData,
}

impl InclusionProof {
    /// Check both paths against a descriptor and the aggregate root.
    pub fn verify(&self, descriptor: &SegmentDescriptor, root: &Node) -> bool {
        self.subtree.verify(&descriptor.commitment, root) && self.index.verify(&descriptor.node(), root)
    }
}
