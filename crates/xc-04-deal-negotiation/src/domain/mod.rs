//! Domain layer: addresses, wire types, configuration and errors.

pub mod address;
pub mod config;
pub mod entities;
pub mod errors;
pub mod wire;

pub use address::{FilecoinAddress, EAM_NAMESPACE};
pub use config::DealConfig;
pub use entities::{ClientIdentity, CollateralBounds, DealRequest, EpochWindow, ProviderPeer};
pub use errors::DealError;
pub use wire::{
    ChainEpoch, ClientDealProposal, DealParams, DealProposal, DealResponse, HttpTransferParams,
    Signature, TokenAmount, TransferDescriptor, DEAL_PROTOCOL,
};
