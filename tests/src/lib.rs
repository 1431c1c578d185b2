//! # XChain Test Suite
//!
//! Cross-subsystem scenarios driving the real watcher, engine, transfer
//! store and axum router against mock chain adapters.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # offers, logs, pipeline harness
//!     ├── commit_flow.rs    # offer -> commit -> transfer served
//!     ├── transfer_http.rs  # GET/HEAD status codes, repeatable bodies
//!     └── redelivery.rs     # duplicate offer ids through watcher + engine
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p xchain-tests
//! cargo test -p xchain-tests integration::commit_flow
//! ```

pub mod integration;
