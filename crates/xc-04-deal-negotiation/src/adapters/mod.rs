//! Adapters layer: Lotus chain queries and the libp2p deal transport.

pub mod codec;
pub mod libp2p_transport;
pub mod lotus;

pub use codec::{DealCodec, DEFAULT_MAX_RESPONSE_BYTES};
pub use libp2p_transport::Libp2pDealTransport;
pub use lotus::LotusChain;
