//! Adapters layer.

pub mod rpc_source;

pub use rpc_source::JsonRpcLogSource;
