//! Domain layer: transfers, registry, configuration and errors.

pub mod config;
pub mod entities;
pub mod errors;
pub mod store;

pub use config::TransferConfig;
pub use entities::Transfer;
pub use errors::TransferError;
pub use store::TransferStore;
