//! # On-Ramp Contract ABI
//!
//! Typed bindings for the parts of the on-ramp contract the bridge touches:
//! the `DataReady` event it emits and the `commitAggregate` call it accepts.
//! Logs decode straight into these types, then convert into the domain
//! [`Offer`] and [`DataReadyEvent`].

use alloy_primitives::{Address, B256};
use alloy_sol_types::SolEvent;

use crate::{DataReadyEvent, EthAddress, Offer, TypeError, H160, U256};

#[allow(missing_docs)]
pub mod abi {
    alloy_sol_types::sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Offer {
            bytes commP;
            uint64 size;
            string cid;
            string location;
            uint256 amount;
            address token;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct ProofData {
            uint64 index;
            bytes32[] path;
        }

        #[derive(Debug, PartialEq, Eq)]
        event DataReady(Offer offer, uint64 id);

        #[derive(Debug, PartialEq, Eq)]
        function commitAggregate(
            bytes aggregate,
            uint64[] ids,
            ProofData[] inclusionProofs,
            address payoutAddr
        );
    }
}

/// Topic0 of `DataReady` logs.
pub fn data_ready_topic() -> B256 {
    abi::DataReady::SIGNATURE_HASH
}

/// Convert an EVM address into the domain representation.
pub fn to_eth_address(address: Address) -> EthAddress {
    H160::from_slice(address.as_slice())
}

/// Convert a domain address into the ABI representation.
pub fn to_abi_address(address: EthAddress) -> Address {
    Address::from_slice(address.as_bytes())
}

impl From<abi::Offer> for Offer {
    fn from(offer: abi::Offer) -> Self {
        Self {
            commitment: offer.commP.to_vec(),
            size: offer.size,
            cid: offer.cid,
            location: offer.location,
            amount: U256::from_big_endian(&offer.amount.to_be_bytes::<32>()),
            token: to_eth_address(offer.token),
        }
    }
}

impl From<abi::DataReady> for DataReadyEvent {
    fn from(event: abi::DataReady) -> Self {
        Self {
            offer: event.offer.into(),
            offer_id: event.id,
        }
    }
}

/// Decode a raw `DataReady` log.
pub fn decode_data_ready(topics: &[B256], data: &[u8]) -> Result<DataReadyEvent, TypeError> {
    abi::DataReady::decode_raw_log(topics.iter().copied(), data, true)
        .map(Into::into)
        .map_err(|e| TypeError::InvalidEvent(e.to_string()))
}
