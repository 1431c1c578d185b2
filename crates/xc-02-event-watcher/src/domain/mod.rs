//! Domain layer: log entities, configuration and errors.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::WatcherConfig;
pub use entities::{LogFilter, RawLog};
pub use errors::WatcherError;
