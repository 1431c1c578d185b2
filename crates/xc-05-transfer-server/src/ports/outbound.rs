//! # Outbound Ports
//!
//! Access to the bytes of individual pieces.

use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use xc_01_data_segment::ByteStream;

/// Source of piece payloads - outbound port.
///
/// `open` must not perform I/O itself; the returned stream fetches on first
/// poll so only pieces actually being read hold a connection.
pub trait PieceSource: Send + Sync {
    /// Lazy stream over the piece at `location`.
    fn open(&self, location: &str) -> ByteStream;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory piece source for testing.
#[derive(Clone, Default)]
pub struct InMemoryPieceSource {
    /// Payload per location.
    pub pieces: HashMap<String, Bytes>,
    /// Should fail?
    pub should_fail: bool,
}

impl InMemoryPieceSource {
    /// Add a piece.
    pub fn with_piece(mut self, location: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.pieces.insert(location.into(), data.into());
        self
    }
}

impl PieceSource for InMemoryPieceSource {
    fn open(&self, location: &str) -> ByteStream {
        if self.should_fail {
            return stream::iter([Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "Mock failure",
            ))])
            .boxed();
        }
        match self.pieces.get(location) {
            Some(data) => stream::iter([Ok(data.clone())]).boxed(),
            None => stream::iter([Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no piece at {location}"),
            ))])
            .boxed(),
        }
    }
}
