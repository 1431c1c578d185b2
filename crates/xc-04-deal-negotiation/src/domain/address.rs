//! # Filecoin Addresses
//!
//! Only the two address classes a deal proposal needs:
//!
//! | Protocol | Used for | Payload |
//! |----------|----------|---------|
//! | 0 (ID) | storage provider actor | `uvarint(actor id)` |
//! | 4 (delegated) | deal client (EVM contract) | `uvarint(namespace) ‖ 20-byte EVM address` |
//!
//! Binary form is `protocol byte ‖ payload`, which is what travels inside
//! the CBOR proposal.

use shared_types::EthAddress;

use super::errors::DealError;

/// Address manager actor id owning the EVM namespace.
pub const EAM_NAMESPACE: u64 = 10;

const PROTOCOL_ID: u8 = 0;
const PROTOCOL_DELEGATED: u8 = 4;

/// A destination-chain account address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilecoinAddress {
    /// Actor id address (`f0…`).
    Id(u64),
    /// Delegated address (`f4…`).
    Delegated {
        /// Namespace actor id.
        namespace: u64,
        /// Sub-address within the namespace.
        subaddress: Vec<u8>,
    },
}

impl FilecoinAddress {
    /// Parse the textual form of an ID address, `f0<id>` or `t0<id>`.
    pub fn parse_id(s: &str) -> Result<Self, DealError> {
        let digits = s
            .strip_prefix("f0")
            .or_else(|| s.strip_prefix("t0"))
            .ok_or_else(|| DealError::InvalidAddress(format!("{} is not an ID address", s)))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DealError::InvalidAddress(format!("{} has a malformed actor id", s)));
        }
        digits
            .parse::<u64>()
            .map(Self::Id)
            .map_err(|e| DealError::InvalidAddress(format!("{}: {}", s, e)))
    }

    /// The `f410…` address an EVM account is known by.
    pub fn from_eth(address: &EthAddress) -> Self {
        Self::Delegated {
            namespace: EAM_NAMESPACE,
            subaddress: address.as_bytes().to_vec(),
        }
    }

    /// Binary encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Id(id) => {
                let mut out = vec![PROTOCOL_ID];
                put_uvarint(&mut out, *id);
                out
            }
            Self::Delegated {
                namespace,
                subaddress,
            } => {
                let mut out = vec![PROTOCOL_DELEGATED];
                put_uvarint(&mut out, *namespace);
                out.extend_from_slice(subaddress);
                out
            }
        }
    }
}

fn put_uvarint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
