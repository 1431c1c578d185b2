//! # Transaction Signer
//!
//! Signs legacy EIP-155 transactions with a secp256k1 key.
//!
//! Signing hash: `keccak256(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))`
//! Raw tx: `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])` with
//! `v = chainId * 2 + 35 + recoveryId`.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};
use shared_types::{EthAddress, U256};

use crate::domain::EngineError;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// EVM address of a public key: last 20 bytes of the keccak of the
/// uncompressed point without its `0x04` prefix.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> EthAddress {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    EthAddress::from_slice(&hash[12..])
}

/// Unsigned legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient.
    pub to: EthAddress,
    /// Value in wei.
    pub value: U256,
    /// Call data.
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&self.to);
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// EIP-155 signing hash.
    pub fn signing_hash(&self, chain_id: u64) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(&stream.out())
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP-encoded transaction.
    pub raw: Vec<u8>,
    /// Transaction hash (keccak of `raw`).
    pub hash: [u8; 32],
}

impl SignedTransaction {
    /// `0x`-prefixed raw transaction.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    /// `0x`-prefixed transaction hash.
    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

/// Holds the commit key.
pub struct TxSigner {
    key: SigningKey,
    address: EthAddress,
}

impl std::fmt::Debug for TxSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl TxSigner {
    /// Load a hex-encoded private key, with or without `0x`.
    pub fn from_hex(key: &str) -> Result<Self, EngineError> {
        let bytes = hex::decode(key.trim().trim_start_matches("0x"))
            .map_err(|e| EngineError::Signer(format!("invalid key hex: {}", e)))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| EngineError::Signer(format!("invalid private key: {}", e)))?;
        let address = address_from_pubkey(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Sender address.
    pub fn address(&self) -> EthAddress {
        self.address
    }

    /// Sign `tx` for `chain_id`.
    pub fn sign(
        &self,
        tx: &LegacyTransaction,
        chain_id: u64,
    ) -> Result<SignedTransaction, EngineError> {
        let hash = tx.signing_hash(chain_id);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| EngineError::Signer(e.to_string()))?;

        let bytes = signature.to_bytes();
        let r = U256::from_big_endian(&bytes[..32]);
        let s = U256::from_big_endian(&bytes[32..]);
        let v = chain_id * 2 + 35 + u64::from(recovery_id.to_byte());

        let mut stream = RlpStream::new_list(9);
        tx.append_fields(&mut stream);
        stream.append(&v);
        stream.append(&r);
        stream.append(&s);
        let raw = stream.out().to_vec();
        let hash = keccak256(&raw);
        Ok(SignedTransaction { raw, hash })
    }
}
