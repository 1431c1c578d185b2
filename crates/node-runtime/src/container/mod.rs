//! # Subsystem Container
//!
//! Configuration loading and construction of every subsystem instance,
//! wired through their ports.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, Secrets};
pub use subsystems::SubsystemContainer;
