//! Ports layer.

pub mod outbound;

pub use outbound::{LogSource, LogStream, MockLogSource, Session};
