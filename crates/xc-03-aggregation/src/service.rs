//! # Aggregation Engine
//!
//! Single consumer of the event queue. After every admitted offer it either
//! keeps accumulating or commits the pending batch:
//!
//! ```text
//! event ─> validate ─> fits target? ─> push ─> placement ─> next size
//!                                                   │
//!                          next <= minimum ─────────┴───── next > minimum
//!                             (accumulate)                      │
//!   grow target ─> aggregate ─> proofs ─> commit ─> register ─> materialize
//!                                   ─> upload ─> propose deal ─> clear batch
//! ```
//!
//! A failed deal proposal is logged and the batch is dropped anyway.

use std::sync::Arc;

use shared_types::{DataReadyEvent, EthAddress, PaddedPieceSize, TargetDealSize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use xc_01_data_segment::{check_fit, compute_placement, next_deal_size, Aggregate};
use xc_05_transfer_server::{PieceSource, TransferStore};
use xchain_telemetry::{
    AGGREGATES_COMMITTED, COMMIT_DURATION, OFFERS_DROPPED, PENDING_OFFERS, TARGET_DEAL_SIZE,
};

use crate::adapters::Materializer;
use crate::domain::{
    AggregationConfig, CommitOutcome, CommitRequest, DealCandidate, EngineError, PendingBatch,
};
use crate::ports::{DealProposer, OnRampContract, RemoteStore};

/// Dependencies for [`AggregationEngine`].
pub struct EngineDependencies {
    /// On-ramp contract commits go to.
    pub onramp: Arc<dyn OnRampContract>,
    /// Remote copy of materialized aggregates; `None` serves them only locally.
    pub remote: Option<Arc<dyn RemoteStore>>,
    /// Deal proposals for committed aggregates.
    pub deals: Arc<dyn DealProposer>,
    /// Transfer registry shared with the transfer server.
    pub store: TransferStore,
    /// Piece bytes for materialization.
    pub source: Arc<dyn PieceSource>,
    /// Shared target deal size.
    pub target: TargetDealSize,
    /// Receives offer payments.
    pub payout: EthAddress,
}

/// Batches offers into aggregates and commits them.
pub struct AggregationEngine {
    onramp: Arc<dyn OnRampContract>,
    remote: Option<Arc<dyn RemoteStore>>,
    deals: Arc<dyn DealProposer>,
    store: TransferStore,
    materializer: Materializer,
    target: TargetDealSize,
    payout: EthAddress,
    batch: PendingBatch,
}

impl AggregationEngine {
    /// Create an engine writing aggregates under `config.data_dir`.
    pub fn new(config: &AggregationConfig, deps: EngineDependencies) -> Self {
        TARGET_DEAL_SIZE.set(deps.target.get().get() as f64);
        Self {
            onramp: deps.onramp,
            remote: deps.remote,
            deals: deps.deals,
            store: deps.store,
            materializer: Materializer::new(config.data_dir.clone(), deps.source),
            target: deps.target,
            payout: deps.payout,
            batch: PendingBatch::new(),
        }
    }

    /// Offers waiting for the next commit.
    pub fn pending(&self) -> &PendingBatch {
        &self.batch
    }

    /// Current target deal size.
    pub fn target(&self) -> PaddedPieceSize {
        self.target.get()
    }

    /// Consume `queue` until it closes, `cancel` fires, or a fatal error.
    pub async fn run(
        mut self,
        mut queue: mpsc::Receiver<DataReadyEvent>,
        cancel: CancellationToken,
    ) -> Result<(), EngineError> {
        info!(
            target_deal_size = self.target.get().get(),
            min_deal_size = self.target.minimum().get(),
            "[xc-03] Aggregation engine started"
        );
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[xc-03] Cancelled, stopping aggregation engine");
                    return Ok(());
                }
                event = queue.recv() => event,
            };
            let Some(event) = event else {
                info!("[xc-03] Event queue closed, stopping aggregation engine");
                return Ok(());
            };

            match self.handle(event, &cancel).await {
                Ok(_) => {}
                Err(EngineError::Cancelled) => {
                    info!("[xc-03] Cancelled during commit, stopping aggregation engine");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "[xc-03] Aggregation failed");
                    return Err(e);
                }
            }
        }
    }

    /// Process one event. Returns the commit summary when it triggered one.
    pub async fn handle(
        &mut self,
        event: DataReadyEvent,
        cancel: &CancellationToken,
    ) -> Result<Option<CommitOutcome>, EngineError> {
        let piece = match event.offer.piece() {
            Ok(piece) => piece,
            Err(e) => {
                OFFERS_DROPPED.with_label_values(&["invalid_piece"]).inc();
                warn!(offer_id = event.offer_id, error = %e, "[xc-03] Invalid offer dropped");
                return Ok(None);
            }
        };

        let target = self.target.get();
        if let Err(e) = check_fit(target, &[piece.size]) {
            OFFERS_DROPPED.with_label_values(&["unpackable"]).inc();
            warn!(
                offer_id = event.offer_id,
                size = piece.size.get(),
                target = target.get(),
                error = %e,
                "[xc-03] Offer cannot fit the target deal size, dropped"
            );
            return Ok(None);
        }

        let offer_id = event.offer_id;
        self.batch.push(event, piece);
        PENDING_OFFERS.set(self.batch.len() as f64);

        let placement = compute_placement(&self.batch.sizes());
        let next = next_deal_size(placement.total)?;
        if next <= self.target.minimum() {
            debug!(
                offer_id,
                pending = self.batch.len(),
                total = self.batch.total(),
                next = next.get(),
                "[xc-03] Accumulating"
            );
            return Ok(None);
        }

        self.commit(next, cancel).await.map(Some)
    }

    async fn commit(
        &mut self,
        next: PaddedPieceSize,
        cancel: &CancellationToken,
    ) -> Result<CommitOutcome, EngineError> {
        let _timer = COMMIT_DURATION.start_timer();

        let deal_size = self.target.grow_to(next);
        TARGET_DEAL_SIZE.set(deal_size.get() as f64);

        let aggregate = Arc::new(Aggregate::new(deal_size, self.batch.pieces())?);
        let proofs = aggregate
            .inclusion_proofs()?
            .into_iter()
            .map(|proof| proof.subtree)
            .collect();
        let commitment = aggregate.commitment()?;
        let offer_ids = self.batch.offer_ids();
        info!(
            commitment = %commitment,
            deal_size = deal_size.get(),
            offers = offer_ids.len(),
            "[xc-03] Created aggregate"
        );

        let request = CommitRequest {
            aggregate: commitment,
            offer_ids: offer_ids.clone(),
            proofs,
            payout: self.payout,
        };
        let receipt = self.onramp.commit_aggregate(&request, cancel).await?;
        AGGREGATES_COMMITTED.inc();
        if receipt.success {
            info!(tx = %receipt.tx_hash, block = ?receipt.block_number, "[xc-03] Aggregate committed");
        } else {
            warn!(tx = %receipt.tx_hash, block = ?receipt.block_number, "[xc-03] Commit transaction reverted");
        }

        let transfer_id = self
            .store
            .register(self.batch.locations(), Arc::clone(&aggregate));
        let transfer = self.store.get(transfer_id).ok_or_else(|| {
            EngineError::Materialize(format!("transfer {} missing after registration", transfer_id))
        })?;
        let file = self
            .materializer
            .write(&transfer, &commitment.to_string())
            .await?;

        let url = match &self.remote {
            Some(remote) => remote.upload(&file).await?,
            None => String::new(),
        };

        let candidate = DealCandidate {
            commitment,
            transfer_id,
            url: url.clone(),
        };
        let deal_accepted = match self.deals.propose(&candidate, cancel).await {
            Ok(()) => {
                info!(commitment = %commitment, transfer_id, "[xc-03] Deal accepted");
                true
            }
            Err(e) => {
                warn!(commitment = %commitment, transfer_id, error = %e, "[xc-03] Deal not made");
                false
            }
        };

        self.batch.clear();
        PENDING_OFFERS.set(0.0);

        Ok(CommitOutcome {
            commitment,
            deal_size,
            offer_ids,
            transfer_id,
            receipt,
            file,
            url,
            deal_accepted,
        })
    }
}
