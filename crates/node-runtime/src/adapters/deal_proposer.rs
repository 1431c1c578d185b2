//! # Deal Proposer Adapter
//!
//! Implements the aggregation engine's `DealProposer` port on top of the
//! deal negotiator.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use xc_03_aggregation::{DealCandidate, DealProposer, EngineError};
use xc_04_deal_negotiation::{DealNegotiator, DealRequest};

/// Adapter forwarding engine deal candidates to [`DealNegotiator`].
pub struct NegotiatorProposer {
    negotiator: Arc<DealNegotiator>,
}

impl NegotiatorProposer {
    /// Wrap a negotiator.
    pub fn new(negotiator: Arc<DealNegotiator>) -> Self {
        Self { negotiator }
    }
}

#[async_trait]
impl DealProposer for NegotiatorProposer {
    async fn propose(
        &self,
        candidate: &DealCandidate,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        let request = DealRequest {
            commitment: candidate.commitment,
            transfer_id: candidate.transfer_id,
            url: candidate.url.clone(),
        };
        let deal = self
            .negotiator
            .propose(&request, cancel)
            .await
            .map_err(|e| EngineError::Deal(e.to_string()))?;
        debug!(deal = %deal, transfer_id = candidate.transfer_id, "[node] Deal proposal forwarded");
        Ok(())
    }
}
