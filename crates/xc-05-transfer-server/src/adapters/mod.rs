//! Adapters layer.

pub mod http_source;

pub use http_source::HttpPieceSource;
