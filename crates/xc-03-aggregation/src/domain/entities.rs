//! # Engine Entities
//!
//! The pending batch and the records that flow out of a commit.

use std::path::PathBuf;

use shared_types::{
    DataReadyEvent, EthAddress, OfferId, PaddedPieceSize, PieceCommitment, PieceInfo, TransferId,
};
use xc_01_data_segment::ProofData;

/// Offers waiting to be aggregated, in arrival order.
///
/// Every member fits the target deal size on its own; admission checks
/// this before [`PendingBatch::push`].
#[derive(Debug, Clone, Default)]
pub struct PendingBatch {
    events: Vec<DataReadyEvent>,
    pieces: Vec<PieceInfo>,
    total: u64,
}

impl PendingBatch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an event whose offer validated as `piece`.
    pub fn push(&mut self, event: DataReadyEvent, piece: PieceInfo) {
        self.total += piece.size.get();
        self.events.push(event);
        self.pieces.push(piece);
    }

    /// Drop every member.
    pub fn clear(&mut self) {
        self.events.clear();
        self.pieces.clear();
        self.total = 0;
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of member padded sizes, including the latest member.
    ///
    /// Informational; commits are decided from the placement total.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Members in arrival order.
    pub fn events(&self) -> &[DataReadyEvent] {
        &self.events
    }

    /// Member pieces in arrival order.
    pub fn pieces(&self) -> &[PieceInfo] {
        &self.pieces
    }

    /// Member sizes in arrival order.
    pub fn sizes(&self) -> Vec<PaddedPieceSize> {
        self.pieces.iter().map(|p| p.size).collect()
    }

    /// Offer ids in arrival order.
    pub fn offer_ids(&self) -> Vec<OfferId> {
        self.events.iter().map(|e| e.offer_id).collect()
    }

    /// Piece source locations in arrival order.
    pub fn locations(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.offer.location.clone())
            .collect()
    }
}

/// Arguments of the on-ramp `commitAggregate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    /// Aggregate commitment.
    pub aggregate: PieceCommitment,
    /// Offer ids, one per piece, in aggregate order.
    pub offer_ids: Vec<OfferId>,
    /// Subtree inclusion proofs, one per piece, same order.
    pub proofs: Vec<ProofData>,
    /// Receives the offers' payments.
    pub payout: EthAddress,
}

/// Outcome of a mined commit transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Transaction hash, `0x`-prefixed.
    pub tx_hash: String,
    /// Block the transaction landed in.
    pub block_number: Option<u64>,
    /// Execution status (`true` for success).
    pub success: bool,
}

/// A committed aggregate ready for a storage deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealCandidate {
    /// Aggregate commitment.
    pub commitment: PieceCommitment,
    /// Transfer registry id.
    pub transfer_id: TransferId,
    /// Public retrieval URL; empty when no remote store is configured.
    pub url: String,
}

/// Summary of one completed commit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Aggregate commitment.
    pub commitment: PieceCommitment,
    /// Padded size the aggregate was built at.
    pub deal_size: PaddedPieceSize,
    /// Offers included, in aggregate order.
    pub offer_ids: Vec<OfferId>,
    /// Transfer registry id.
    pub transfer_id: TransferId,
    /// Commit transaction receipt.
    pub receipt: CommitReceipt,
    /// Materialized aggregate file.
    pub file: PathBuf,
    /// Retrieval URL from the remote store, if any.
    pub url: String,
    /// Whether the provider accepted the deal.
    pub deal_accepted: bool,
}
