//! Ports layer.

pub mod outbound;

pub use outbound::{
    DealProposer, MockDealProposer, MockOnRamp, MockRemoteStore, OnRampContract, RemoteStore,
};
