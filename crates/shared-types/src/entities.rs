//! # Core Domain Entities
//!
//! Offers as published by the on-ramp contract, and the identifiers that
//! flow between the watcher, the aggregation engine and the transfer store.

use serde::{Deserialize, Serialize};

use crate::{PaddedPieceSize, PieceCommitment, PieceInfo, TypeError};

// Re-export primitive-types for use across all subsystems
pub use primitive_types::{H160, U256};

/// A 20-byte EVM account address.
pub type EthAddress = H160;

/// Dedup identity of an offer, unique per source chain.
pub type OfferId = u64;

/// Key of a committed aggregate in the transfer registry.
pub type TransferId = u64;

/// An off-chain data commitment submitted on the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Piece commitment as binary CID bytes.
    pub commitment: Vec<u8>,
    /// Padded piece size in bytes.
    pub size: u64,
    /// Content identifier of the payload.
    pub cid: String,
    /// URL the piece bytes can be fetched from.
    pub location: String,
    /// Payment amount.
    pub amount: U256,
    /// Payment token.
    pub token: EthAddress,
}

impl Offer {
    /// Validate size and commitment and return the piece they describe.
    pub fn piece(&self) -> Result<PieceInfo, TypeError> {
        let size = PaddedPieceSize::new(self.size)?;
        let commitment = PieceCommitment::from_cid_bytes(&self.commitment)?;
        Ok(PieceInfo { size, commitment })
    }
}

/// A decoded `DataReady` log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataReadyEvent {
    /// The offer.
    pub offer: Offer,
    /// Its on-chain identifier.
    pub offer_id: OfferId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(size: u64, commitment: Vec<u8>) -> Offer {
        Offer {
            commitment,
            size,
            cid: "bafy".into(),
            location: "http://buffer/piece".into(),
            amount: U256::from(10u64),
            token: H160::zero(),
        }
    }

    #[test]
    fn test_offer_piece_valid() {
        let commitment = PieceCommitment::from_node([3u8; 32]).unwrap();
        let piece = offer(2048, commitment.to_bytes()).piece().unwrap();
        assert_eq!(piece.size.get(), 2048);
        assert_eq!(piece.commitment, commitment);
    }

    #[test]
    fn test_offer_piece_bad_size() {
        let commitment = PieceCommitment::from_node([3u8; 32]).unwrap();
        assert_eq!(
            offer(1000, commitment.to_bytes()).piece(),
            Err(TypeError::InvalidPieceSize(1000))
        );
    }

    #[test]
    fn test_offer_piece_bad_commitment() {
        assert!(matches!(
            offer(2048, vec![1, 2, 3]).piece(),
            Err(TypeError::InvalidCommitment(_))
        ));
    }

    #[test]
    fn test_event_serde() {
        let event = DataReadyEvent {
            offer: offer(128, vec![1]),
            offer_id: 9,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DataReadyEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
