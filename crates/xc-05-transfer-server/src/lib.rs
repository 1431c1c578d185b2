//! # XC-05 Transfer Server
//!
//! Registry of committed aggregates and the HTTP endpoint storage providers
//! pull them from.
//!
//! **Subsystem ID:** 05
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Record each committed aggregate under a fresh, monotonically increasing
//!   transfer id; entries are never evicted
//! - Rebuild the exact aggregate payload on demand, fetching each piece
//!   lazily from its offer location
//! - Serve `GET|HEAD /?id=N` with a fixed `Content-Length`
//!
//! ## Status Codes
//!
//! | Request | Status |
//! |---------|--------|
//! | `GET /` | 400 `ID is required` |
//! | `GET /?id=x` | 400 `Invalid ID` |
//! | `GET /?id=99` (unknown) | 404 `No data found` |
//! | `GET /?id=0` | 200, aggregate bytes |
//! | `HEAD /...` | 200, no body |
//!
//! ## Module Structure
//!
//! ```text
//! xc-05-transfer-server/
//! ├── domain/          # Transfer, TransferStore, TransferConfig, errors
//! ├── ports/           # PieceSource
//! ├── adapters/        # HttpPieceSource (reqwest)
//! ├── router.rs        # axum routes
//! └── service.rs       # TransferServer (bind + graceful shutdown)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod router;
pub mod service;

// Re-exports
pub use adapters::HttpPieceSource;
pub use domain::{Transfer, TransferConfig, TransferError, TransferStore};
pub use ports::{InMemoryPieceSource, PieceSource};
pub use router::{build_router, AppState};
pub use service::TransferServer;

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
