//! # Transfers
//!
//! A committed aggregate together with the locations of its pieces.

use std::sync::Arc;

use shared_types::TransferId;
use xc_01_data_segment::{Aggregate, ByteStream};

use super::errors::TransferError;
use crate::ports::PieceSource;

/// A registry entry. Never mutated after registration.
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Registry key.
    pub id: TransferId,
    /// Source URL of each piece, in aggregate supply order.
    pub locations: Vec<String>,
    /// The committed aggregate.
    pub aggregate: Arc<Aggregate>,
}

impl Transfer {
    /// Byte length of the reconstructed payload.
    pub fn content_length(&self) -> u64 {
        self.aggregate.unpadded_size()
    }

    /// Reconstruct the aggregate payload. Piece fetches start only when the
    /// stream reaches them.
    pub fn object_stream(&self, source: &dyn PieceSource) -> Result<ByteStream, TransferError> {
        let sources = self
            .locations
            .iter()
            .map(|location| source.open(location))
            .collect();
        Ok(self.aggregate.object_stream(sources)?)
    }
}
