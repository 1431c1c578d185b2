//! # Deal Protocol Wire Types
//!
//! Request and response of the `/fil/storage/mk/1.2.0` market protocol,
//! encoded as DAG-CBOR. Field names and shapes must match what storage
//! providers decode:
//!
//! | Type | CBOR shape |
//! |------|------------|
//! | `DealParams`, `TransferDescriptor`, `DealResponse` | map keyed by field name |
//! | `ClientDealProposal` | 2-tuple `[proposal, signature]` |
//! | `DealProposal` | 11-tuple in field order |
//! | CIDs | tag 42 |
//! | addresses, signatures, token amounts | byte strings |

use cid::Cid;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use shared_types::U256;
use uuid::Uuid;

use super::address::FilecoinAddress;
use super::errors::DealError;

/// Market protocol id spoken with the storage provider.
pub const DEAL_PROTOCOL: &str = "/fil/storage/mk/1.2.0";

/// Signature type byte for BLS signatures.
pub const SIG_TYPE_BLS: u8 = 2;

/// Data carried by the placeholder client signature.
pub const PLACEHOLDER_SIGNATURE: [u8; 3] = [0xc0, 0xff, 0xee];

/// Destination chain epoch.
pub type ChainEpoch = i64;

/// A non-negative token amount in attoFIL.
///
/// Encoded as an empty byte string for zero, otherwise a sign byte
/// (`0x00`) followed by the big-endian magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    /// Zero.
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Binary encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        let mut be = [0u8; 32];
        self.0.to_big_endian(&mut be);
        let first = be.iter().position(|b| *b != 0).unwrap_or(be.len());
        let mut out = Vec::with_capacity(1 + be.len() - first);
        out.push(0x00);
        out.extend_from_slice(&be[first..]);
        out
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

/// A typed signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Signature type byte.
    pub sig_type: u8,
    /// Raw signature bytes.
    pub data: Vec<u8>,
}

impl Signature {
    /// Fixed stand-in signature. The deal client is a contract, so the
    /// provider authorizes it on chain rather than by this signature.
    pub fn placeholder() -> Self {
        Self {
            sig_type: SIG_TYPE_BLS,
            data: PLACEHOLDER_SIGNATURE.to_vec(),
        }
    }

    /// Binary encoding: type byte then data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.data.len());
        out.push(self.sig_type);
        out.extend_from_slice(&self.data);
        out
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

/// On-chain deal terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealProposal {
    /// Aggregate commitment.
    pub piece_cid: Cid,
    /// Padded aggregate size.
    pub piece_size: u64,
    /// Deal uses datacap.
    pub verified_deal: bool,
    /// Paying client.
    pub client: FilecoinAddress,
    /// Storage provider actor.
    pub provider: FilecoinAddress,
    /// Free-form label; carries the source chain id.
    pub label: String,
    /// First epoch the deal must be active.
    pub start_epoch: ChainEpoch,
    /// Epoch the deal expires.
    pub end_epoch: ChainEpoch,
    /// Price per epoch.
    pub storage_price_per_epoch: TokenAmount,
    /// Collateral locked by the provider.
    pub provider_collateral: TokenAmount,
    /// Collateral locked by the client.
    pub client_collateral: TokenAmount,
}

impl Serialize for DealProposal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let client = self.client.to_bytes();
        let provider = self.provider.to_bytes();

        let mut tuple = serializer.serialize_tuple(11)?;
        tuple.serialize_element(&self.piece_cid)?;
        tuple.serialize_element(&self.piece_size)?;
        tuple.serialize_element(&self.verified_deal)?;
        tuple.serialize_element(serde_bytes::Bytes::new(&client))?;
        tuple.serialize_element(serde_bytes::Bytes::new(&provider))?;
        tuple.serialize_element(&self.label)?;
        tuple.serialize_element(&self.start_epoch)?;
        tuple.serialize_element(&self.end_epoch)?;
        tuple.serialize_element(&self.storage_price_per_epoch)?;
        tuple.serialize_element(&self.provider_collateral)?;
        tuple.serialize_element(&self.client_collateral)?;
        tuple.end()
    }
}

/// Proposal plus client signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDealProposal {
    /// The terms.
    pub proposal: DealProposal,
    /// Client signature over the terms.
    pub client_signature: Signature,
}

impl Serialize for ClientDealProposal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.proposal)?;
        tuple.serialize_element(&self.client_signature)?;
        tuple.end()
    }
}

/// JSON parameters of an HTTP transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTransferParams {
    /// Where the provider pulls the aggregate from.
    #[serde(rename = "URL")]
    pub url: String,
}

/// How the provider obtains the deal data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferDescriptor {
    /// Transfer kind, always `http` here.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Client-side transfer id, unused.
    #[serde(rename = "ClientID")]
    pub client_id: String,
    /// JSON-encoded [`HttpTransferParams`].
    #[serde(rename = "Params", with = "serde_bytes")]
    pub params: Vec<u8>,
    /// Bytes the provider should expect.
    #[serde(rename = "Size")]
    pub size: u64,
}

impl TransferDescriptor {
    /// HTTP pull of `size` bytes from `url`.
    pub fn http(url: &str, size: u64) -> Result<Self, DealError> {
        let params = serde_json::to_vec(&HttpTransferParams {
            url: url.to_string(),
        })
        .map_err(|e| DealError::Encoding(e.to_string()))?;
        Ok(Self {
            kind: "http".to_string(),
            client_id: String::new(),
            params,
            size,
        })
    }
}

fn uuid_bytes<S: Serializer>(uuid: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(uuid.as_bytes())
}

/// Deal request sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealParams {
    /// Client-chosen deal id.
    #[serde(rename = "DealUUID", serialize_with = "uuid_bytes")]
    pub deal_uuid: Uuid,
    /// Data arrives out of band.
    #[serde(rename = "IsOffline")]
    pub is_offline: bool,
    /// Signed proposal.
    #[serde(rename = "ClientDealProposal")]
    pub client_deal_proposal: ClientDealProposal,
    /// Root of the deal data.
    #[serde(rename = "DealDataRoot")]
    pub deal_data_root: Cid,
    /// Transfer instructions.
    #[serde(rename = "Transfer")]
    pub transfer: TransferDescriptor,
    /// Drop the unsealed copy after sealing.
    #[serde(rename = "RemoveUnsealedCopy")]
    pub remove_unsealed_copy: bool,
    /// Skip announcing to the indexer.
    #[serde(rename = "SkipIPNIAnnounce")]
    pub skip_ipni_announce: bool,
}

impl DealParams {
    /// DAG-CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, DealError> {
        serde_ipld_dagcbor::to_vec(self).map_err(|e| DealError::Encoding(e.to_string()))
    }
}

/// Provider's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealResponse {
    /// Whether the deal was accepted.
    #[serde(rename = "Accepted")]
    pub accepted: bool,
    /// Reason, set on rejection.
    #[serde(rename = "Message")]
    pub message: String,
}

impl DealResponse {
    /// Decode DAG-CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, DealError> {
        serde_ipld_dagcbor::from_slice(bytes).map_err(|e| DealError::Encoding(e.to_string()))
    }

    /// DAG-CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, DealError> {
        serde_ipld_dagcbor::to_vec(self).map_err(|e| DealError::Encoding(e.to_string()))
    }
}
