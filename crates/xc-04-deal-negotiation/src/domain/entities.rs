//! Values exchanged between the negotiator and its ports.

use libp2p::{Multiaddr, PeerId};
use shared_types::{EthAddress, PieceCommitment, TransferId, U256};

use super::wire::ChainEpoch;

/// Collateral range the destination chain allows for a deal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralBounds {
    /// Lower bound.
    pub min: U256,
    /// Upper bound.
    pub max: U256,
}

impl CollateralBounds {
    /// Collateral offered: 1.2 times the minimum, rounded down.
    pub fn proposed(&self) -> U256 {
        self.min * U256::from(6u64) / U256::from(5u64)
    }
}

/// Where a storage provider can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPeer {
    /// libp2p identity.
    pub peer_id: PeerId,
    /// Listen addresses.
    pub addrs: Vec<Multiaddr>,
}

/// What the negotiator is asked to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRequest {
    /// Aggregate commitment.
    pub commitment: PieceCommitment,
    /// Registry id the provider can pull by.
    pub transfer_id: TransferId,
    /// Public retrieval URL; empty means use the self-hosted transfer URL.
    pub url: String,
}

/// Who the deals are made for, and where the data can be pulled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// EVM address of the client contract on the destination chain.
    pub address: EthAddress,
    /// Source chain id, written into every deal label.
    pub source_chain_id: u64,
    /// `host:port` of the self-hosted transfer server.
    pub transfer_addr: String,
}

impl ClientIdentity {
    /// Self-hosted URL of a registered transfer.
    pub fn transfer_url(&self, transfer_id: TransferId) -> String {
        format!("http://{}/?id={}", self.transfer_addr, transfer_id)
    }
}

/// Start and end of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochWindow {
    /// First active epoch.
    pub start: ChainEpoch,
    /// Expiry epoch.
    pub end: ChainEpoch,
}

impl EpochWindow {
    /// Window opening `delay` epochs after `head`, lasting `duration`.
    pub fn after(head: ChainEpoch, delay: i64, duration: i64) -> Self {
        let start = head + delay;
        Self {
            start,
            end: start + duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collateral_is_six_fifths_of_minimum() {
        let bounds = CollateralBounds {
            min: U256::from(1000u64),
            max: U256::from(5000u64),
        };
        assert_eq!(bounds.proposed(), U256::from(1200u64));

        let odd = CollateralBounds {
            min: U256::from(7u64),
            max: U256::from(7u64),
        };
        assert_eq!(odd.proposed(), U256::from(8u64));
    }

    #[test]
    fn test_fallback_transfer_url() {
        let identity = ClientIdentity {
            address: EthAddress::zero(),
            source_chain_id: 314159,
            transfer_addr: "10.0.0.5:5077".into(),
        };
        assert_eq!(identity.transfer_url(3), "http://10.0.0.5:5077/?id=3");
    }

    #[test]
    fn test_epoch_window() {
        let window = EpochWindow::after(1_000, 3_000, 518_400);
        assert_eq!(window.start, 4_000);
        assert_eq!(window.end, 522_400);
    }
}
