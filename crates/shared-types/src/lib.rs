//! # Shared Types Crate
//!
//! Domain entities shared by every bridge subsystem.
//!
//! ## Contents
//!
//! - **Offers**: `Offer`, `DataReadyEvent`, `OfferId` as emitted by the
//!   on-ramp contract on the source chain.
//! - **Pieces**: `PaddedPieceSize`, `PieceCommitment`, `PieceInfo`.
//! - **On-ramp ABI**: typed `DataReady` / `commitAggregate` bindings and
//!   their conversion into the domain types.
//! - **Deal sizing**: `TargetDealSize`, the process-wide aggregate size that
//!   only grows.
//!
//! ## Design Principles
//!
//! - **Validated construction**: a `PaddedPieceSize` or `PieceCommitment`
//!   that exists is well formed; raw values are checked at the boundary.
//! - **Single owner of mutation**: `TargetDealSize` is cloneable for readers
//!   but only the aggregation engine calls [`TargetDealSize::grow_to`].

pub mod deal_size;
pub mod entities;
pub mod errors;
pub mod onramp;
pub mod piece;

pub use deal_size::TargetDealSize;
pub use entities::*;
pub use errors::*;
pub use piece::*;
