//! Ports layer.

pub mod outbound;

pub use outbound::{DealTransport, DestinationChain, MockDealTransport, MockDestinationChain};
