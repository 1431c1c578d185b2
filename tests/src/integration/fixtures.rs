//! # Test Fixtures
//!
//! Offers, on-ramp logs and a pipeline harness sharing one transfer store
//! and target deal size between the aggregation engine and the router.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256 as AbiU256};
use alloy_sol_types::SolEvent;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use futures::stream::{self, StreamExt};
use node_runtime::adapters::NegotiatorProposer;
use shared_types::onramp::abi;
use shared_types::{
    DataReadyEvent, EthAddress, Offer, PaddedPieceSize, PieceCommitment, TargetDealSize, U256,
};
use tower::ServiceExt;
use xc_01_data_segment::ByteStream;
use xc_02_event_watcher::{RawLog, WatcherError};
use xc_03_aggregation::{
    AggregationConfig, AggregationEngine, DealProposer, EngineDependencies, MockDealProposer,
    MockOnRamp,
};
use xc_04_deal_negotiation::{
    ClientIdentity, DealConfig, DealNegotiator, MockDealTransport, MockDestinationChain,
};
use xc_05_transfer_server::{build_router, AppState, PieceSource, TransferStore};

/// Every piece reads as empty; reconstruction zero-fills it.
pub struct EmptySource;

impl PieceSource for EmptySource {
    fn open(&self, _location: &str) -> ByteStream {
        stream::empty().boxed()
    }
}

/// Padded size, panicking on invalid input.
pub fn size(value: u64) -> PaddedPieceSize {
    PaddedPieceSize::new(value).unwrap()
}

/// Commitment unique to `id` (within 250 ids).
pub fn commitment(id: u64) -> PieceCommitment {
    PieceCommitment::from_node([(id % 250) as u8 + 1; 32]).unwrap()
}

/// Offer `id` of padded `size`, located at `mem://<id>`.
pub fn offer(id: u64, size: u64) -> Offer {
    Offer {
        commitment: commitment(id).to_bytes(),
        size,
        cid: format!("bafy-{}", id),
        location: format!("mem://{}", id),
        amount: U256::from(id),
        token: EthAddress::zero(),
    }
}

/// Decoded `DataReady` event.
pub fn offer_event(id: u64, size: u64) -> DataReadyEvent {
    DataReadyEvent {
        offer: offer(id, size),
        offer_id: id,
    }
}

/// `DataReady` log as the on-ramp contract emits it.
pub fn data_ready_log(id: u64, size: u64) -> Result<RawLog, WatcherError> {
    let event = abi::DataReady {
        offer: abi::Offer {
            commP: Bytes::from(commitment(id).to_bytes()),
            size,
            cid: format!("bafy-{}", id),
            location: format!("mem://{}", id),
            amount: AbiU256::from(id),
            token: Address::ZERO,
        },
        id,
    };
    let data = event.encode_log_data();
    Ok(RawLog {
        address: Address::ZERO,
        topics: data.topics().to_vec(),
        data: data.data,
        block_number: None,
        transaction_hash: None,
        removed: false,
    })
}

/// Engine and router over shared state, with mock chain adapters.
pub struct Pipeline {
    /// On-ramp mock recording commits.
    pub onramp: MockOnRamp,
    /// Deal proposer handed to the engine.
    pub deals: Arc<dyn DealProposer>,
    /// Transfer registry.
    pub store: TransferStore,
    /// Target deal size.
    pub target: TargetDealSize,
    /// Piece bytes for materialization and serving.
    pub source: Arc<dyn PieceSource>,
    /// Aggregation thresholds.
    pub config: AggregationConfig,
    /// Materialization directory.
    pub dir: tempfile::TempDir,
}

impl Pipeline {
    /// Pipeline with `min_deal_size = target_deal_size = deal_size`.
    pub fn new(deal_size: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AggregationConfig {
            target_deal_size: deal_size,
            min_deal_size: deal_size,
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        Self {
            onramp: MockOnRamp::default(),
            deals: Arc::new(MockDealProposer::default()),
            store: TransferStore::new(),
            target: config.target().unwrap(),
            source: Arc::new(EmptySource),
            config,
            dir,
        }
    }

    /// Replace the piece source.
    pub fn with_source(mut self, source: Arc<dyn PieceSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the deal proposer.
    pub fn with_deals(mut self, deals: Arc<dyn DealProposer>) -> Self {
        self.deals = deals;
        self
    }

    /// Deal negotiator whose provider rejects every proposal with `message`.
    pub fn rejecting_negotiator(&self, message: &str) -> Arc<dyn DealProposer> {
        let negotiator = DealNegotiator::new(
            Arc::new(MockDestinationChain::new(1_000)),
            Arc::new(MockDealTransport::rejecting(message)),
            DealConfig {
                provider_address: "t01000".into(),
                ..Default::default()
            },
            ClientIdentity {
                address: EthAddress::repeat_byte(0x42),
                source_chain_id: 314159,
                transfer_addr: "127.0.0.1:8080".into(),
            },
            self.target.clone(),
        )
        .unwrap();
        Arc::new(NegotiatorProposer::new(Arc::new(negotiator)))
    }

    /// Aggregation engine over this pipeline's state, without remote upload.
    pub fn engine(&self) -> AggregationEngine {
        AggregationEngine::new(
            &self.config,
            EngineDependencies {
                onramp: Arc::new(self.onramp.clone()),
                remote: None,
                deals: self.deals.clone(),
                store: self.store.clone(),
                source: self.source.clone(),
                target: self.target.clone(),
                payout: EthAddress::repeat_byte(0x99),
            },
        )
    }

    /// Transfer router over this pipeline's state.
    pub fn router(&self) -> Router {
        build_router(AppState {
            store: self.store.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        })
    }
}

/// Response status, headers and full body.
pub struct Reply {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Collected body.
    pub body: Vec<u8>,
}

impl Reply {
    /// Parsed `Content-Length` header.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(axum::http::header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

/// Send one request through `router`.
pub async fn send(router: Router, method: Method, uri: &str) -> Reply {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}
