//! # Adapters
//!
//! Port implementations connecting one subsystem to another.

pub mod deal_proposer;

pub use deal_proposer::NegotiatorProposer;
