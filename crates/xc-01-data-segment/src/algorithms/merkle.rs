//! # Merkle Primitives
//!
//! Binary sha256 tree with the two most significant bits of every node
//! cleared, so each node is a valid field element. Absent subtrees are
//! represented by the zero commitment of their level.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use sha2::{Digest, Sha256};

use crate::domain::{Node, ProofData};

/// Height of the tallest tree we ever build (2^64 bytes of leaves).
const MAX_LEVELS: usize = 64;

/// Clear the two high bits of the final byte.
pub fn truncate(node: &mut Node) {
    node[31] &= 0b0011_1111;
}

/// Parent of two sibling nodes.
pub fn hash_pair(left: &Node, right: &Node) -> Node {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let mut out: Node = hasher.finalize().into();
    truncate(&mut out);
    out
}

/// Root of an all-zero subtree of the given height.
pub fn zero_commitment(level: u32) -> Node {
    static TABLE: OnceLock<Vec<Node>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(MAX_LEVELS);
        let mut node = [0u8; 32];
        for _ in 0..MAX_LEVELS {
            table.push(node);
            node = hash_pair(&node, &node);
        }
        table
    });
    table[(level as usize).min(MAX_LEVELS - 1)]
}

/// Root over a dense, power-of-two sized leaf layer.
pub fn root_of_leaves(leaves: &[Node]) -> Node {
    if leaves.is_empty() {
        return zero_commitment(0);
    }
    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [single] => hash_pair(single, &zero_commitment(0)),
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
    }
    layer[0]
}

/// Sparse tree: only populated nodes are stored, everything else is a zero
/// commitment of the matching level.
#[derive(Debug, Clone)]
pub struct SparseTree {
    height: u32,
    levels: Vec<BTreeMap<u64, Node>>,
}

impl SparseTree {
    /// Empty tree with `height` levels above the leaves.
    pub fn new(height: u32) -> Self {
        Self {
            height,
            levels: vec![BTreeMap::new(); height as usize + 1],
        }
    }

    /// Levels above the leaves.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Place a subtree root.
    pub fn set(&mut self, level: u32, index: u64, node: Node) {
        self.levels[level as usize].insert(index, node);
    }

    /// Node at a position, or the zero commitment.
    pub fn get(&self, level: u32, index: u64) -> Node {
        self.levels
            .get(level as usize)
            .and_then(|nodes| nodes.get(&index))
            .copied()
            .unwrap_or_else(|| zero_commitment(level))
    }

    /// Fill every ancestor of the populated nodes.
    pub fn build(&mut self) {
        for level in 0..self.height {
            let parents: Vec<u64> = {
                let mut parents: Vec<u64> =
                    self.levels[level as usize].keys().map(|i| i >> 1).collect();
                parents.dedup();
                parents
            };
            for parent in parents {
                let left = self.get(level, parent << 1);
                let right = self.get(level, (parent << 1) | 1);
                self.levels[level as usize + 1]
                    .entry(parent)
                    .or_insert_with(|| hash_pair(&left, &right));
            }
        }
    }

    /// Root of the tree. Call after [`SparseTree::build`].
    pub fn root(&self) -> Node {
        self.get(self.height, 0)
    }

    /// Sibling path from a node to the root.
    pub fn proof(&self, level: u32, index: u64) -> ProofData {
        let mut path = Vec::with_capacity((self.height - level) as usize);
        let mut idx = index;
        for l in level..self.height {
            path.push(self.get(l, idx ^ 1));
            idx >>= 1;
        }
        ProofData { index, path }
    }
}
