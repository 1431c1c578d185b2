//! # XC-02 Event Watcher
//!
//! Ingests `DataReady` events from the on-ramp contract on the source chain.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Maintain a filtered log subscription on the on-ramp contract
//! - Decode each entry straight into a typed `DataReadyEvent`
//! - Forward each `OfferId` to the aggregation queue at most once, across
//!   reconnects
//!
//! ## Failure Handling
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | Transient network error ([`WatcherError::is_transient`]) | re-subscribe after `reconnect_delay` |
//! | Subscription stream ended | re-subscribe after `reconnect_delay` |
//! | Undecodable log | fatal |
//! | Any other error | fatal |
//! | Queue closed / cancelled | clean return |
//!
//! ## Module Structure
//!
//! ```text
//! xc-02-event-watcher/
//! ├── domain/          # RawLog, LogFilter, WatcherConfig, errors
//! ├── ports/           # LogSource (+ MockLogSource)
//! ├── adapters/        # JsonRpcLogSource (eth_newFilter polling)
//! └── service.rs       # EventWatcher
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::JsonRpcLogSource;
pub use domain::{LogFilter, RawLog, WatcherConfig, WatcherError};
pub use ports::{LogSource, LogStream, MockLogSource};
pub use service::EventWatcher;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
