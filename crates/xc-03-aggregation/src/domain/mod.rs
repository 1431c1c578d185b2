//! Domain layer: pending batch, commit records, configuration and errors.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::{AggregationConfig, UploadConfig};
pub use entities::{CommitOutcome, CommitReceipt, CommitRequest, DealCandidate, PendingBatch};
pub use errors::EngineError;
