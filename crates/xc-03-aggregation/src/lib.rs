//! # XC-03 Aggregation Engine
//!
//! Turns the stream of admitted offers into right-sized aggregates, commits
//! them on the source chain and hands them to storage.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Validate each offer and drop those that can never be packed
//! - Accumulate offers until the next power-of-two deal size exceeds the
//!   configured minimum
//! - Build the aggregate, its inclusion proofs and commitment, and submit
//!   `commitAggregate` on the on-ramp contract
//! - Register the transfer, materialize it to disk, upload it and propose
//!   a storage deal
//!
//! ## Failure Handling
//!
//! | Step | On failure |
//! |------|------------|
//! | Offer validation / fit check | offer dropped, logged |
//! | Aggregate construction, commit | fatal |
//! | Materialize, upload | fatal |
//! | Deal proposal | logged; batch dropped anyway |
//!
//! ## Module Structure
//!
//! ```text
//! xc-03-aggregation/
//! ├── domain/          # PendingBatch, CommitRequest, configs, EngineError
//! ├── ports/           # OnRampContract, RemoteStore, DealProposer (+ mocks)
//! ├── adapters/        # EvmOnRamp + TxSigner, LighthouseStore, Materializer
//! └── service.rs       # AggregationEngine
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{encode_commit, EvmOnRamp, LighthouseStore, Materializer, TxSigner};
pub use domain::{
    AggregationConfig, CommitOutcome, CommitReceipt, CommitRequest, DealCandidate, EngineError,
    PendingBatch, UploadConfig,
};
pub use ports::{
    DealProposer, MockDealProposer, MockOnRamp, MockRemoteStore, OnRampContract, RemoteStore,
};
pub use service::{AggregationEngine, EngineDependencies};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
