//! # Lotus Destination Chain
//!
//! [`DestinationChain`] over the Lotus full-node JSON-RPC API.
//!
//! | Query | Method |
//! |-------|--------|
//! | head | `Filecoin.ChainHead` |
//! | collateral | `Filecoin.StateDealProviderCollateralBounds` |
//! | provider | `Filecoin.StateMinerInfo` |

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use libp2p::{Multiaddr, PeerId};
use serde::Deserialize;
use serde_json::json;
use shared_rpc::JsonRpcClient;
use shared_types::{PaddedPieceSize, U256};
use tracing::debug;

use crate::domain::{ChainEpoch, CollateralBounds, DealError, ProviderPeer};
use crate::ports::DestinationChain;

#[derive(Debug, Deserialize)]
struct TipSet {
    #[serde(rename = "Height")]
    height: ChainEpoch,
}

#[derive(Debug, Deserialize)]
struct Bounds {
    #[serde(rename = "Min")]
    min: String,
    #[serde(rename = "Max")]
    max: String,
}

#[derive(Debug, Deserialize)]
struct MinerInfo {
    #[serde(rename = "PeerId", default)]
    peer_id: Option<String>,
    #[serde(rename = "Multiaddrs", default)]
    multiaddrs: Option<Vec<String>>,
}

/// Lotus JSON-RPC client.
pub struct LotusChain {
    client: Arc<JsonRpcClient>,
}

impl LotusChain {
    /// Wrap a client pointed at a Lotus `/rpc/v1` endpoint.
    pub fn new(client: Arc<JsonRpcClient>) -> Self {
        Self { client }
    }
}

fn parse_amount(field: &str, value: &str) -> Result<U256, DealError> {
    U256::from_dec_str(value)
        .map_err(|e| DealError::ProviderInfo(format!("{} {:?}: {:?}", field, value, e)))
}

fn parse_peer(provider: &str, info: MinerInfo) -> Result<ProviderPeer, DealError> {
    let peer_id = info
        .peer_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| DealError::ProviderInfo(format!("{} has no peer id", provider)))?;
    let peer_id: PeerId = peer_id
        .parse()
        .map_err(|e| DealError::ProviderInfo(format!("{}: bad peer id: {}", provider, e)))?;

    let addrs = info
        .multiaddrs
        .unwrap_or_default()
        .iter()
        .map(|encoded| {
            let raw = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| DealError::ProviderInfo(format!("{}: {}", provider, e)))?;
            Multiaddr::try_from(raw)
                .map_err(|e| DealError::ProviderInfo(format!("{}: {}", provider, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if addrs.is_empty() {
        return Err(DealError::ProviderInfo(format!(
            "{} has no multiaddrs",
            provider
        )));
    }

    Ok(ProviderPeer { peer_id, addrs })
}

#[async_trait]
impl DestinationChain for LotusChain {
    async fn chain_head(&self) -> Result<ChainEpoch, DealError> {
        let head: TipSet = self.client.call("Filecoin.ChainHead", [(); 0]).await?;
        Ok(head.height)
    }

    async fn collateral_bounds(
        &self,
        size: PaddedPieceSize,
        verified: bool,
    ) -> Result<CollateralBounds, DealError> {
        let bounds: Bounds = self
            .client
            .call(
                "Filecoin.StateDealProviderCollateralBounds",
                json!([size.get(), verified, null]),
            )
            .await?;
        Ok(CollateralBounds {
            min: parse_amount("Min", &bounds.min)?,
            max: parse_amount("Max", &bounds.max)?,
        })
    }

    async fn provider_peer(&self, provider: &str) -> Result<ProviderPeer, DealError> {
        let info: MinerInfo = self
            .client
            .call("Filecoin.StateMinerInfo", json!([provider, null]))
            .await?;
        let peer = parse_peer(provider, info)?;
        debug!(provider, peer = %peer.peer_id, addrs = peer.addrs.len(), "[xc-04] Resolved provider");
        Ok(peer)
    }
}
