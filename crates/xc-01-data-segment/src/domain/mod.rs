//! Domain layer: aggregate model, layout rules and errors.

pub mod aggregate;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use aggregate::Aggregate;
pub use entities::{InclusionProof, Location, Placement, ProofData, SegmentDescriptor};
pub use errors::DataSegmentError;
pub use value_objects::{
    index_start_offset, max_index_entries, next_deal_size, unpadded_len, Node, ENTRY_SIZE,
    LAYOUT_OVERHEAD, MIN_INDEX_ENTRIES,
};
