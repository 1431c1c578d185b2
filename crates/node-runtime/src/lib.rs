//! # Node Runtime
//!
//! Library half of the `xchain-node` binary: configuration, subsystem
//! wiring and the task group that runs them.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load `config.toml` and read secrets from the environment
//! 3. Validate configuration for the chosen source chain
//! 4. Build subsystems ([`SubsystemContainer`])
//! 5. Run watcher, engine and transfer server until Ctrl-C or the first failure
//!
//! ## Module Structure
//!
//! ```text
//! node-runtime/
//! ├── container/       # NodeConfig, Secrets, SubsystemContainer
//! ├── adapters/        # NegotiatorProposer (engine -> deal negotiator)
//! ├── runtime.rs       # NodeRuntime (JoinSet + CancellationToken)
//! └── main.rs          # clap CLI
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod runtime;

pub use container::{ConfigError, NodeConfig, Secrets, SubsystemContainer};
pub use runtime::{NodeRuntime, RuntimeError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
