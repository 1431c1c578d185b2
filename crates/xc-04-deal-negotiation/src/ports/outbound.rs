//! # Outbound Ports
//!
//! What the negotiator needs from the outside world: destination chain
//! state and a way to reach the storage provider.

use std::sync::Arc;

use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId};
use parking_lot::Mutex;
use shared_types::{PaddedPieceSize, U256};
use tokio_util::sync::CancellationToken;

use crate::domain::{
    ChainEpoch, CollateralBounds, DealError, DealParams, DealResponse, ProviderPeer,
};

/// Destination chain queries - outbound port.
#[async_trait]
pub trait DestinationChain: Send + Sync {
    /// Height of the current head.
    async fn chain_head(&self) -> Result<ChainEpoch, DealError>;

    /// Provider collateral bounds for a deal of `size`.
    async fn collateral_bounds(
        &self,
        size: PaddedPieceSize,
        verified: bool,
    ) -> Result<CollateralBounds, DealError>;

    /// Peer identity and addresses registered for the provider actor.
    async fn provider_peer(&self, provider: &str) -> Result<ProviderPeer, DealError>;
}

/// One request/response exchange with a provider - outbound port.
#[async_trait]
pub trait DealTransport: Send + Sync {
    /// Confirm protocol support, send `params`, return the single response.
    ///
    /// Must give up with [`DealError::Cancelled`] once `cancel` fires.
    async fn send(
        &self,
        provider: &ProviderPeer,
        params: DealParams,
        cancel: &CancellationToken,
    ) -> Result<DealResponse, DealError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock destination chain with fixed answers.
#[derive(Clone)]
pub struct MockDestinationChain {
    /// Reported head.
    pub head: ChainEpoch,
    /// Reported bounds.
    pub bounds: CollateralBounds,
    /// Registered provider; `None` makes `provider_peer` fail.
    pub peer: Option<ProviderPeer>,
    /// Should fail?
    pub should_fail: bool,
    pub(crate) queries: Arc<Mutex<Vec<(PaddedPieceSize, bool)>>>,
}

impl MockDestinationChain {
    /// Chain at `head` with a provider reachable on a local address.
    pub fn new(head: ChainEpoch) -> Self {
        let addr: Multiaddr = "/ip4/127.0.0.1/tcp/24001"
            .parse()
            .unwrap_or_else(|_| Multiaddr::empty());
        Self {
            head,
            bounds: CollateralBounds {
                min: U256::from(1_000u64),
                max: U256::from(10_000u64),
            },
            peer: Some(ProviderPeer {
                peer_id: PeerId::random(),
                addrs: vec![addr],
            }),
            should_fail: false,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sizes `collateral_bounds` was asked about.
    pub fn queried_sizes(&self) -> Vec<PaddedPieceSize> {
        self.queries.lock().iter().map(|(size, _)| *size).collect()
    }

    /// `verified` flags `collateral_bounds` was called with.
    pub fn queried_verified(&self) -> Vec<bool> {
        self.queries.lock().iter().map(|(_, verified)| *verified).collect()
    }
}

#[async_trait]
impl DestinationChain for MockDestinationChain {
    async fn chain_head(&self) -> Result<ChainEpoch, DealError> {
        if self.should_fail {
            return Err(DealError::Transport("Mock failure".to_string()));
        }
        Ok(self.head)
    }

    async fn collateral_bounds(
        &self,
        size: PaddedPieceSize,
        verified: bool,
    ) -> Result<CollateralBounds, DealError> {
        if self.should_fail {
            return Err(DealError::Transport("Mock failure".to_string()));
        }
        self.queries.lock().push((size, verified));
        Ok(self.bounds)
    }

    async fn provider_peer(&self, provider: &str) -> Result<ProviderPeer, DealError> {
        if self.should_fail {
            return Err(DealError::Transport("Mock failure".to_string()));
        }
        self.peer
            .clone()
            .ok_or_else(|| DealError::ProviderInfo(format!("{} has no peer id", provider)))
    }
}

/// Mock transport answering every request with a fixed response.
#[derive(Clone)]
pub struct MockDealTransport {
    /// Response returned for every request.
    pub response: DealResponse,
    /// Pretend the provider lacks the protocol.
    pub unsupported: bool,
    /// Should fail?
    pub should_fail: bool,
    pub(crate) sent: Arc<Mutex<Vec<DealParams>>>,
}

impl MockDealTransport {
    /// Provider that accepts everything.
    pub fn accepting() -> Self {
        Self::answering(true, "")
    }

    /// Provider that rejects everything with `message`.
    pub fn rejecting(message: &str) -> Self {
        Self::answering(false, message)
    }

    fn answering(accepted: bool, message: &str) -> Self {
        Self {
            response: DealResponse {
                accepted,
                message: message.to_string(),
            },
            unsupported: false,
            should_fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far.
    pub fn sent(&self) -> Vec<DealParams> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DealTransport for MockDealTransport {
    async fn send(
        &self,
        provider: &ProviderPeer,
        params: DealParams,
        cancel: &CancellationToken,
    ) -> Result<DealResponse, DealError> {
        if cancel.is_cancelled() {
            return Err(DealError::Cancelled);
        }
        if self.should_fail {
            return Err(DealError::Transport("Mock failure".to_string()));
        }
        if self.unsupported {
            return Err(DealError::UnsupportedProtocol {
                peer: provider.peer_id.to_string(),
            });
        }
        self.sent.lock().push(params);
        Ok(self.response.clone())
    }
}
