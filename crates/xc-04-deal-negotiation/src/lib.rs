//! # XC-04 Deal Negotiation
//!
//! Proposes a storage deal for each committed aggregate to the configured
//! storage provider.
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Resolve the provider's peer id and addresses from its on-chain
//!   registration
//! - Price the deal: collateral at 1.2x the chain minimum, zero price per
//!   epoch, verified
//! - Exchange exactly one request/response over `/fil/storage/mk/1.2.0`
//!
//! ## Proposal Fields
//!
//! | Field | Source |
//! |-------|--------|
//! | Piece CID / size | aggregate commitment, current target deal size |
//! | Client | delegated address of the client contract |
//! | Label | source chain id, decimal |
//! | Start / end epoch | head + delay, start + duration |
//! | Transfer | `http` pull, `size − size/128` bytes |
//! | Signature | fixed placeholder |
//!
//! ## Module Structure
//!
//! ```text
//! xc-04-deal-negotiation/
//! ├── domain/          # addresses, wire types, DealConfig, errors
//! ├── ports/           # DestinationChain, DealTransport (+ mocks)
//! ├── adapters/        # LotusChain, Libp2pDealTransport, DealCodec
//! └── service.rs       # DealNegotiator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{DealCodec, Libp2pDealTransport, LotusChain};
pub use domain::{
    ClientIdentity, CollateralBounds, DealConfig, DealError, DealParams, DealRequest,
    DealResponse, FilecoinAddress, ProviderPeer, DEAL_PROTOCOL,
};
pub use ports::{DealTransport, DestinationChain, MockDealTransport, MockDestinationChain};
pub use service::DealNegotiator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
