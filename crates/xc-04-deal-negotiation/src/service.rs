//! # Deal Negotiator
//!
//! Turns a committed aggregate into one storage deal proposal and exchanges
//! it with the configured provider in a single round trip.
//!
//! ```text
//! provider_peer ──> collateral_bounds(target) ──> chain_head
//!        │                   │ min·6/5               │ +delay, +duration
//!        └───────────────> DealParams <──────────────┘
//!                              │ DealTransport::send (bound to cancel)
//!                              v
//!                  Accepted ──> Ok(deal uuid)   else ──> Rejected(message)
//! ```
//!
//! Nothing here retries; the caller decides what a failure means.

use std::sync::Arc;

use shared_types::TargetDealSize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;
use xchain_telemetry::DEAL_PROPOSALS;

use crate::domain::{
    ClientDealProposal, ClientIdentity, DealConfig, DealError, DealParams, DealProposal,
    DealRequest, EpochWindow, FilecoinAddress, Signature, TokenAmount, TransferDescriptor,
};
use crate::ports::{DealTransport, DestinationChain};

/// Storage deal proposer for one provider.
pub struct DealNegotiator {
    chain: Arc<dyn DestinationChain>,
    transport: Arc<dyn DealTransport>,
    config: DealConfig,
    provider: FilecoinAddress,
    client: FilecoinAddress,
    identity: ClientIdentity,
    target: TargetDealSize,
}

impl DealNegotiator {
    /// Negotiator proposing deals of the current `target` size.
    pub fn new(
        chain: Arc<dyn DestinationChain>,
        transport: Arc<dyn DealTransport>,
        config: DealConfig,
        identity: ClientIdentity,
        target: TargetDealSize,
    ) -> Result<Self, DealError> {
        config.validate()?;
        let provider = config.provider()?;
        let client = FilecoinAddress::from_eth(&identity.address);
        Ok(Self {
            chain,
            transport,
            config,
            provider,
            client,
            identity,
            target,
        })
    }

    /// Assemble the request for `request` without sending it.
    pub async fn build_params(&self, request: &DealRequest) -> Result<DealParams, DealError> {
        let size = self.target.get();
        let url = if request.url.is_empty() {
            self.identity.transfer_url(request.transfer_id)
        } else {
            request.url.clone()
        };

        let bounds = self.chain.collateral_bounds(size, false).await?;
        let head = self.chain.chain_head().await?;
        let window = EpochWindow::after(
            head,
            self.config.delay_epochs,
            self.config.duration_epochs,
        );
        let piece_cid = request.commitment.cid();

        Ok(DealParams {
            deal_uuid: Uuid::new_v4(),
            is_offline: false,
            client_deal_proposal: ClientDealProposal {
                proposal: DealProposal {
                    piece_cid,
                    piece_size: size.get(),
                    verified_deal: true,
                    client: self.client.clone(),
                    provider: self.provider.clone(),
                    label: self.identity.source_chain_id.to_string(),
                    start_epoch: window.start,
                    end_epoch: window.end,
                    storage_price_per_epoch: TokenAmount::zero(),
                    provider_collateral: TokenAmount(bounds.proposed()),
                    client_collateral: TokenAmount::zero(),
                },
                client_signature: Signature::placeholder(),
            },
            deal_data_root: piece_cid,
            transfer: TransferDescriptor::http(&url, size.unpadded())?,
            remove_unsealed_copy: false,
            skip_ipni_announce: false,
        })
    }

    /// Propose a deal for a committed aggregate. Returns the deal uuid once
    /// the provider accepts.
    pub async fn propose(
        &self,
        request: &DealRequest,
        cancel: &CancellationToken,
    ) -> Result<Uuid, DealError> {
        let result = self.exchange(request, cancel).await;
        match &result {
            Ok(uuid) => {
                DEAL_PROPOSALS.with_label_values(&["accepted"]).inc();
                info!(
                    deal = %uuid,
                    commitment = %request.commitment,
                    transfer_id = request.transfer_id,
                    "[xc-04] Deal accepted"
                );
            }
            Err(e) => {
                DEAL_PROPOSALS.with_label_values(&[e.outcome()]).inc();
                warn!(
                    error = %e,
                    commitment = %request.commitment,
                    transfer_id = request.transfer_id,
                    "[xc-04] Deal proposal failed"
                );
            }
        }
        result
    }

    async fn exchange(
        &self,
        request: &DealRequest,
        cancel: &CancellationToken,
    ) -> Result<Uuid, DealError> {
        let peer = self
            .chain
            .provider_peer(&self.config.provider_address)
            .await?;
        let params = self.build_params(request).await?;
        let uuid = params.deal_uuid;

        let proposal = &params.client_deal_proposal.proposal;
        info!(
            deal = %uuid,
            provider = %self.config.provider_address,
            peer = %peer.peer_id,
            piece_size = proposal.piece_size,
            start_epoch = proposal.start_epoch,
            end_epoch = proposal.end_epoch,
            "[xc-04] Proposing deal"
        );

        let response = self.transport.send(&peer, params, cancel).await?;
        if !response.accepted {
            return Err(DealError::Rejected(response.message));
        }
        Ok(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockDealTransport, MockDestinationChain};
    use crate::domain::HttpTransferParams;
    use shared_types::{EthAddress, PaddedPieceSize, PieceCommitment, U256};

    fn size(v: u64) -> PaddedPieceSize {
        PaddedPieceSize::new(v).unwrap()
    }

    fn identity() -> ClientIdentity {
        ClientIdentity {
            address: EthAddress::repeat_byte(0x42),
            source_chain_id: 314159,
            transfer_addr: "127.0.0.1:5077".into(),
        }
    }

    fn config() -> DealConfig {
        DealConfig {
            provider_address: "f01000".into(),
            delay_epochs: 100,
            duration_epochs: 1_000,
            ..Default::default()
        }
    }

    fn request(url: &str) -> DealRequest {
        DealRequest {
            commitment: PieceCommitment::from_node([5u8; 32]).unwrap(),
            transfer_id: 7,
            url: url.into(),
        }
    }

    fn negotiator(
        chain: MockDestinationChain,
        transport: MockDealTransport,
    ) -> (DealNegotiator, TargetDealSize) {
        let target = TargetDealSize::new(size(1 << 20), size(1 << 20));
        let negotiator = DealNegotiator::new(
            Arc::new(chain),
            Arc::new(transport),
            config(),
            identity(),
            target.clone(),
        )
        .unwrap();
        (negotiator, target)
    }

    #[tokio::test]
    async fn test_proposal_terms() {
        let (negotiator, _) =
            negotiator(MockDestinationChain::new(5_000), MockDealTransport::accepting());
        let params = negotiator.build_params(&request("")).await.unwrap();
        let proposal = &params.client_deal_proposal.proposal;

        assert_eq!(proposal.piece_size, 1 << 20);
        assert!(proposal.verified_deal);
        assert_eq!(proposal.start_epoch, 5_100);
        assert_eq!(proposal.end_epoch, 6_100);
        assert_eq!(proposal.label, "314159");
        assert_eq!(proposal.provider, FilecoinAddress::Id(1000));
        assert_eq!(
            proposal.client,
            FilecoinAddress::from_eth(&EthAddress::repeat_byte(0x42))
        );
        assert_eq!(proposal.storage_price_per_epoch, TokenAmount::zero());
        assert_eq!(proposal.provider_collateral, TokenAmount(U256::from(1_200u64)));
        assert_eq!(params.deal_data_root, proposal.piece_cid);
        assert!(!params.is_offline);
        assert_eq!(params.transfer.size, (1 << 20) - (1 << 13));
    }

    #[tokio::test]
    async fn test_fallback_url_when_none_given() {
        let (negotiator, _) =
            negotiator(MockDestinationChain::new(1), MockDealTransport::accepting());

        let params = negotiator.build_params(&request("")).await.unwrap();
        let http: HttpTransferParams = serde_json::from_slice(&params.transfer.params).unwrap();
        assert_eq!(http.url, "http://127.0.0.1:5077/?id=7");

        let params = negotiator
            .build_params(&request("https://gateway/ipfs/Qm"))
            .await
            .unwrap();
        let http: HttpTransferParams = serde_json::from_slice(&params.transfer.params).unwrap();
        assert_eq!(http.url, "https://gateway/ipfs/Qm");
    }

    #[tokio::test]
    async fn test_collateral_follows_target_size() {
        let chain = MockDestinationChain::new(1);
        let (negotiator, target) = negotiator(chain.clone(), MockDealTransport::accepting());
        target.grow_to(size(1 << 22));

        let params = negotiator.build_params(&request("")).await.unwrap();
        assert_eq!(params.client_deal_proposal.proposal.piece_size, 1 << 22);
        assert_eq!(chain.queried_sizes(), vec![size(1 << 22)]);
    }

    #[tokio::test]
    async fn test_collateral_uses_unverified_bounds() {
        let chain = MockDestinationChain::new(1);
        let (negotiator, _) = negotiator(chain.clone(), MockDealTransport::accepting());

        let params = negotiator.build_params(&request("")).await.unwrap();
        assert_eq!(chain.queried_verified(), vec![false]);
        assert!(params.client_deal_proposal.proposal.verified_deal);
    }

    #[tokio::test]
    async fn test_accepted_deal() {
        let transport = MockDealTransport::accepting();
        let (negotiator, _) = negotiator(MockDestinationChain::new(1), transport.clone());

        let uuid = negotiator
            .propose(&request(""), &CancellationToken::new())
            .await
            .unwrap();
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].deal_uuid, uuid);
    }

    #[tokio::test]
    async fn test_rejected_deal_carries_message() {
        let (negotiator, _) = negotiator(
            MockDestinationChain::new(1),
            MockDealTransport::rejecting("insufficient collateral"),
        );
        let err = negotiator
            .propose(&request(""), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "deal proposal rejected: insufficient collateral"
        );
    }

    #[tokio::test]
    async fn test_unsupported_protocol() {
        let transport = MockDealTransport {
            unsupported: true,
            ..MockDealTransport::accepting()
        };
        let (negotiator, _) = negotiator(MockDestinationChain::new(1), transport);
        let err = negotiator
            .propose(&request(""), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DealError::UnsupportedProtocol { .. }));
    }

    #[tokio::test]
    async fn test_chain_failure_sends_nothing() {
        let transport = MockDealTransport::accepting();
        let chain = MockDestinationChain {
            should_fail: true,
            ..MockDestinationChain::new(1)
        };
        let (negotiator, _) = negotiator(chain, transport.clone());
        assert!(negotiator
            .propose(&request(""), &CancellationToken::new())
            .await
            .is_err());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled() {
        let (negotiator, _) =
            negotiator(MockDestinationChain::new(1), MockDealTransport::accepting());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = negotiator.propose(&request(""), &cancel).await.unwrap_err();
        assert!(matches!(err, DealError::Cancelled));
    }

    #[test]
    fn test_invalid_provider_rejected() {
        let result = DealNegotiator::new(
            Arc::new(MockDestinationChain::new(1)),
            Arc::new(MockDealTransport::accepting()),
            DealConfig {
                provider_address: "f1xyz".into(),
                ..config()
            },
            identity(),
            TargetDealSize::new(size(1 << 20), size(1 << 20)),
        );
        assert!(matches!(result, Err(DealError::Config(_))));
    }
}
