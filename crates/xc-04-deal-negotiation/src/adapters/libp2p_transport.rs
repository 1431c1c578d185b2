//! # libp2p Deal Transport
//!
//! [`DealTransport`] over a short-lived libp2p swarm.
//!
//! ```text
//! dial(peer, addrs) ──> identify ──protocols include mk/1.2.0?──> send_request
//!                                  └─ no ──> UnsupportedProtocol
//! response ──> Ok(DealResponse)     outbound failure / dial error ──> Transport
//! ```
//!
//! One swarm is built per proposal and dropped afterwards; the node's
//! identity key is reused across swarms.

use std::iter;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use libp2p::request_response::{self, ProtocolSupport};
use libp2p::swarm::dial_opts::DialOpts;
use libp2p::swarm::{NetworkBehaviour, SwarmEvent};
use libp2p::{identify, identity, noise, tcp, yamux, PeerId, StreamProtocol, Swarm, SwarmBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::codec::DealCodec;
use crate::domain::{DealConfig, DealError, DealParams, DealResponse, ProviderPeer, DEAL_PROTOCOL};
use crate::ports::DealTransport;

const IDENTIFY_PROTOCOL: &str = "/xchain/deal-client/1.0.0";

#[derive(NetworkBehaviour)]
struct DealBehaviour {
    identify: identify::Behaviour,
    request_response: request_response::Behaviour<DealCodec>,
}

/// Deal client speaking the market protocol over TCP + noise + yamux.
pub struct Libp2pDealTransport {
    keypair: identity::Keypair,
    request_timeout: Duration,
    max_response_bytes: u64,
}

impl Libp2pDealTransport {
    /// Transport with a fresh ed25519 identity.
    pub fn new(request_timeout: Duration, max_response_bytes: u64) -> Self {
        Self {
            keypair: identity::Keypair::generate_ed25519(),
            request_timeout,
            max_response_bytes,
        }
    }

    /// Transport using the timeouts and limits from `config`.
    pub fn from_config(config: &DealConfig) -> Self {
        Self::new(config.request_timeout(), config.max_response_bytes)
    }

    /// Our peer id.
    pub fn peer_id(&self) -> PeerId {
        self.keypair.public().to_peer_id()
    }

    fn build_swarm(&self) -> Result<Swarm<DealBehaviour>, DealError> {
        let codec = DealCodec::new(self.max_response_bytes);
        let request_timeout = self.request_timeout;

        let swarm = SwarmBuilder::with_existing_identity(self.keypair.clone())
            .with_tokio()
            .with_tcp(
                tcp::Config::default(),
                noise::Config::new,
                yamux::Config::default,
            )
            .map_err(|e| DealError::Transport(e.to_string()))?
            .with_behaviour(|key| DealBehaviour {
                identify: identify::Behaviour::new(identify::Config::new(
                    IDENTIFY_PROTOCOL.to_string(),
                    key.public(),
                )),
                request_response: request_response::Behaviour::with_codec(
                    codec,
                    iter::once((StreamProtocol::new(DEAL_PROTOCOL), ProtocolSupport::Outbound)),
                    request_response::Config::default().with_request_timeout(request_timeout),
                ),
            })
            .map_err(|e| DealError::Transport(e.to_string()))?
            .with_swarm_config(|c| c.with_idle_connection_timeout(request_timeout))
            .build();
        Ok(swarm)
    }
}

#[async_trait]
impl DealTransport for Libp2pDealTransport {
    async fn send(
        &self,
        provider: &ProviderPeer,
        params: DealParams,
        cancel: &CancellationToken,
    ) -> Result<DealResponse, DealError> {
        if cancel.is_cancelled() {
            return Err(DealError::Cancelled);
        }
        let mut swarm = self.build_swarm()?;
        let target = provider.peer_id;
        swarm
            .dial(
                DialOpts::peer_id(target)
                    .addresses(provider.addrs.clone())
                    .build(),
            )
            .map_err(|e| DealError::Transport(format!("dial {}: {}", target, e)))?;

        let mut pending = Some(params);
        let deadline = tokio::time::sleep(self.request_timeout);
        tokio::pin!(deadline);

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DealError::Cancelled),
                _ = &mut deadline => {
                    return Err(DealError::Transport(format!("no response from {}", target)));
                }
                event = swarm.select_next_some() => event,
            };

            match event {
                SwarmEvent::ConnectionEstablished { peer_id, .. } if peer_id == target => {
                    debug!(peer = %peer_id, "[xc-04] Connected to provider");
                }
                SwarmEvent::Behaviour(DealBehaviourEvent::Identify(identify::Event::Received {
                    peer_id,
                    info,
                })) if peer_id == target => {
                    if !info.protocols.iter().any(|p| p.as_ref() == DEAL_PROTOCOL) {
                        return Err(DealError::UnsupportedProtocol {
                            peer: peer_id.to_string(),
                        });
                    }
                    if let Some(params) = pending.take() {
                        let id = swarm
                            .behaviour_mut()
                            .request_response
                            .send_request(&peer_id, params);
                        info!(peer = %peer_id, request = %id, "[xc-04] Deal proposal sent");
                    }
                }
                SwarmEvent::Behaviour(DealBehaviourEvent::RequestResponse(
                    request_response::Event::Message {
                        message: request_response::Message::Response { response, .. },
                        ..
                    },
                )) => return Ok(response),
                SwarmEvent::Behaviour(DealBehaviourEvent::RequestResponse(
                    request_response::Event::OutboundFailure { peer, error, .. },
                )) => {
                    return Err(DealError::Transport(format!("{}: {}", peer, error)));
                }
                SwarmEvent::OutgoingConnectionError {
                    peer_id: Some(peer_id),
                    error,
                    ..
                } if peer_id == target => {
                    return Err(DealError::Transport(format!("dial {}: {}", peer_id, error)));
                }
                SwarmEvent::ConnectionClosed { peer_id, cause, .. }
                    if peer_id == target && pending.is_some() =>
                {
                    return Err(DealError::Transport(format!(
                        "{} closed the connection before identify: {:?}",
                        peer_id, cause
                    )));
                }
                _ => {}
            }
        }
    }
}
