//! # Subsystem Container
//!
//! Builds every subsystem for one source chain and holds them until the
//! runtime takes ownership.
//!
//! ## Wiring
//!
//! ```text
//! source RPC ──> JsonRpcLogSource ──> EventWatcher ──(queue)──> AggregationEngine
//!     │                                                         │   │   │
//!     └──────────────> EvmOnRamp (TxSigner) <───────────────────┘   │   │
//!                      LighthouseStore <────────────────────────────┘   │
//!  Lotus RPC ──> LotusChain ─┐                                          │
//!                 Libp2p ────┴─> DealNegotiator <── NegotiatorProposer <┘
//!
//! TransferStore + TargetDealSize: shared by the engine and TransferServer
//! ```

use std::sync::Arc;

use shared_rpc::JsonRpcClient;
use shared_types::{onramp::to_abi_address, TargetDealSize};
use tracing::info;
use xc_02_event_watcher::{EventWatcher, JsonRpcLogSource, LogFilter};
use xc_03_aggregation::{
    AggregationEngine, EngineDependencies, EvmOnRamp, LighthouseStore, RemoteStore, TxSigner,
};
use xc_04_deal_negotiation::{ClientIdentity, DealNegotiator, Libp2pDealTransport, LotusChain};
use xc_05_transfer_server::{HttpPieceSource, PieceSource, TransferServer, TransferStore};

use super::config::{parse_address, ConfigError, NodeConfig, Secrets};
use crate::adapters::NegotiatorProposer;

/// All subsystem instances for one source chain.
pub struct SubsystemContainer {
    /// Source chain name
    pub chain: String,
    /// Subsystem 02: on-ramp event watcher
    pub watcher: EventWatcher,
    /// Subsystem 03: aggregation engine
    pub engine: AggregationEngine,
    /// Subsystem 05: transfer server
    pub server: TransferServer,
    /// Transfer registry shared by engine and server
    pub store: TransferStore,
    /// Target deal size shared by engine, negotiator and server
    pub target: TargetDealSize,
    /// Watcher to engine queue capacity
    pub queue_capacity: usize,
}

impl SubsystemContainer {
    /// Validate `config` and build the subsystems for `chain`.
    pub fn build(config: &NodeConfig, chain: &str, secrets: &Secrets) -> Result<Self, ConfigError> {
        config.validate(chain)?;
        let invalid = |what: &str, e: &dyn std::fmt::Display| {
            ConfigError::Invalid(format!("{}: {}", what, e))
        };

        let source = config.source(chain)?;
        let on_ramp = parse_address("on_ramp_address", &source.on_ramp_address)?;
        let target = config
            .aggregation
            .target()
            .map_err(|e| invalid("aggregation", &e))?;
        let store = TransferStore::new();

        // Source chain
        let source_rpc = Arc::new(
            JsonRpcClient::new(source.api.as_str()).map_err(|e| invalid("source api", &e))?,
        );
        let logs = JsonRpcLogSource::new(source_rpc.clone(), config.watcher.poll_interval());
        let watcher = EventWatcher::new(
            Arc::new(logs),
            LogFilter::data_ready(to_abi_address(on_ramp)),
            config.watcher.clone(),
        );

        let signer =
            TxSigner::from_hex(&secrets.signer_key).map_err(|e| invalid("XC_SIGNER_KEY", &e))?;
        let onramp = EvmOnRamp::new(
            source_rpc,
            on_ramp,
            signer,
            config.aggregation.receipt_poll_interval(),
        );
        info!(
            chain,
            chain_id = source.chain_id,
            on_ramp = %source.on_ramp_address,
            sender = ?onramp.sender(),
            "[node] Source chain configured"
        );

        let remote: Option<Arc<dyn RemoteStore>> = if config.upload.enabled {
            let store = LighthouseStore::new(&config.upload, secrets.lighthouse_key()?)
                .map_err(|e| invalid("upload", &e))?;
            Some(Arc::new(store))
        } else {
            info!("[node] Remote upload disabled, deals point at the transfer server");
            None
        };

        // Destination chain
        let mut lotus = JsonRpcClient::new(config.destination.lotus_api.as_str())
            .map_err(|e| invalid("destination.lotus_api", &e))?;
        if let Some(token) = &secrets.lotus_token {
            lotus = lotus.with_bearer(token.as_str());
        }
        let deal_config = config.deal_config();
        let transport = Libp2pDealTransport::from_config(&deal_config);
        let identity = ClientIdentity {
            address: config.prover()?,
            source_chain_id: source.chain_id,
            transfer_addr: config.transfer.advertised_addr(),
        };
        let negotiator = DealNegotiator::new(
            Arc::new(LotusChain::new(Arc::new(lotus))),
            Arc::new(transport),
            deal_config,
            identity,
            target.clone(),
        )
        .map_err(|e| invalid("deal", &e))?;

        let pieces: Arc<dyn PieceSource> = Arc::new(HttpPieceSource::new(reqwest::Client::new()));
        let engine = AggregationEngine::new(
            &config.aggregation,
            EngineDependencies {
                onramp: Arc::new(onramp),
                remote,
                deals: Arc::new(NegotiatorProposer::new(Arc::new(negotiator))),
                store: store.clone(),
                source: pieces.clone(),
                target: target.clone(),
                payout: config.payout()?,
            },
        );
        let server = TransferServer::new(config.transfer.clone(), store.clone(), pieces, target.clone());

        Ok(Self {
            chain: chain.to_string(),
            watcher,
            engine,
            server,
            store,
            target,
            queue_capacity: config.aggregation.queue_capacity,
        })
    }
}
