//! Adapters layer.

pub mod evm_onramp;
pub mod lighthouse;
pub mod materializer;
pub mod signer;

pub use evm_onramp::{encode_commit, EvmOnRamp};
pub use lighthouse::LighthouseStore;
pub use materializer::Materializer;
pub use signer::{LegacyTransaction, SignedTransaction, TxSigner};
