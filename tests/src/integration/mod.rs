//! Cross-subsystem integration scenarios.

pub mod fixtures;

mod commit_flow;
mod redelivery;
mod transfer_http;
