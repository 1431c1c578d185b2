//! # Pieces
//!
//! Padded piece sizes and piece commitments.
//!
//! A padded piece is a power-of-two number of bytes where every 128 bytes
//! carry 127 bytes of payload (two bits of every 32-byte node are reserved).
//! A piece commitment is the root of the piece's merkle tree, carried on
//! the wire as a CIDv1 with the `fil-commitment-unsealed` codec and the
//! `sha2-256-trunc254-padded` multihash.

use std::fmt;

use cid::multihash::Multihash;
use cid::Cid;

use crate::TypeError;

/// Multicodec for unsealed piece commitments.
pub const FIL_COMMITMENT_UNSEALED: u64 = 0xf101;

/// Multihash code for truncated sha256 merkle roots.
pub const SHA2_256_TRUNC254_PADDED: u64 = 0x1012;

/// Smallest legal padded piece.
pub const MIN_PADDED_PIECE_SIZE: u64 = 128;

/// Size of one merkle node in bytes.
pub const NODE_SIZE: u64 = 32;

/// A validated padded piece size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaddedPieceSize(u64);

impl PaddedPieceSize {
    /// Validate a raw padded size.
    pub fn new(size: u64) -> Result<Self, TypeError> {
        if size < MIN_PADDED_PIECE_SIZE || !size.is_power_of_two() {
            return Err(TypeError::InvalidPieceSize(size));
        }
        Ok(Self(size))
    }

    /// Raw padded size in bytes.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Payload bytes carried by this piece.
    pub fn unpadded(self) -> u64 {
        self.0 - self.0 / 128
    }

    /// Number of 32-byte leaves.
    pub fn leaves(self) -> u64 {
        self.0 / NODE_SIZE
    }

    /// Tree height above the leaves.
    pub fn level(self) -> u32 {
        self.leaves().trailing_zeros()
    }
}

impl fmt::Display for PaddedPieceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root commitment of a piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceCommitment {
    cid: Cid,
}

impl PieceCommitment {
    /// Wrap a raw merkle root.
    pub fn from_node(node: [u8; 32]) -> Result<Self, TypeError> {
        let hash = Multihash::<64>::wrap(SHA2_256_TRUNC254_PADDED, &node)
            .map_err(|e| TypeError::InvalidCommitment(e.to_string()))?;
        Ok(Self {
            cid: Cid::new_v1(FIL_COMMITMENT_UNSEALED, hash),
        })
    }

    /// Parse binary CID bytes as emitted by the on-ramp contract.
    pub fn from_cid_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let cid = Cid::try_from(bytes).map_err(|e| TypeError::InvalidCommitment(e.to_string()))?;
        Self::from_cid(cid)
    }

    /// Accept a CID after checking codec, hash function and digest length.
    pub fn from_cid(cid: Cid) -> Result<Self, TypeError> {
        if cid.codec() != FIL_COMMITMENT_UNSEALED {
            return Err(TypeError::InvalidCommitment(format!(
                "unexpected codec 0x{:x}",
                cid.codec()
            )));
        }
        if cid.hash().code() != SHA2_256_TRUNC254_PADDED {
            return Err(TypeError::InvalidCommitment(format!(
                "unexpected multihash 0x{:x}",
                cid.hash().code()
            )));
        }
        if cid.hash().digest().len() != 32 {
            return Err(TypeError::InvalidCommitment(format!(
                "digest is {} bytes",
                cid.hash().digest().len()
            )));
        }
        Ok(Self { cid })
    }

    /// The raw 32-byte merkle root.
    pub fn node(&self) -> [u8; 32] {
        let mut node = [0u8; 32];
        node.copy_from_slice(self.cid.hash().digest());
        node
    }

    /// The commitment as a CID.
    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// Binary CID encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cid.to_bytes()
    }
}

impl fmt::Display for PieceCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cid)
    }
}

impl fmt::Debug for PieceCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceCommitment({})", self.cid)
    }
}

/// A piece as seen by the aggregator: size plus commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceInfo {
    /// Padded size.
    pub size: PaddedPieceSize,
    /// Root commitment.
    pub commitment: PieceCommitment,
}
