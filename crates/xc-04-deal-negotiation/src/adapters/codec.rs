//! Request/response codec for the deal protocol.
//!
//! A request is one DAG-CBOR object written to a fresh stream; the
//! provider answers with one DAG-CBOR object and closes the stream. The
//! client never serves proposals, so the inbound half is refused.

use std::io;

use async_trait::async_trait;
use futures::prelude::*;
use libp2p::request_response;
use libp2p::StreamProtocol;

use crate::domain::{DealParams, DealResponse};

/// Default ceiling for a provider response.
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// DAG-CBOR codec for `/fil/storage/mk/1.2.0`.
#[derive(Debug, Clone)]
pub struct DealCodec {
    max_response_bytes: u64,
}

impl DealCodec {
    /// Codec refusing responses larger than `max_response_bytes`.
    pub fn new(max_response_bytes: u64) -> Self {
        Self { max_response_bytes }
    }
}

impl Default for DealCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESPONSE_BYTES)
    }
}

fn outbound_only() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "deal client does not accept proposals",
    )
}

#[async_trait]
impl request_response::Codec for DealCodec {
    type Protocol = StreamProtocol;
    type Request = DealParams;
    type Response = DealResponse;

    async fn read_request<T: AsyncRead + Unpin + Send>(
        &mut self,
        _: &Self::Protocol,
        _: &mut T,
    ) -> io::Result<Self::Request> {
        Err(outbound_only())
    }

    async fn read_response<T: AsyncRead + Unpin + Send>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
    ) -> io::Result<Self::Response> {
        let mut buf = Vec::new();
        io.take(self.max_response_bytes + 1)
            .read_to_end(&mut buf)
            .await?;
        if buf.len() as u64 > self.max_response_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("response exceeds {} bytes", self.max_response_bytes),
            ));
        }
        DealResponse::from_cbor(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write_request<T: AsyncWrite + Unpin + Send>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
        req: Self::Request,
    ) -> io::Result<()> {
        let bytes = req
            .to_cbor()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        io.write_all(&bytes).await?;
        io.flush().await
    }

    async fn write_response<T: AsyncWrite + Unpin + Send>(
        &mut self,
        _: &Self::Protocol,
        _: &mut T,
        _: Self::Response,
    ) -> io::Result<()> {
        Err(outbound_only())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;
    use libp2p::request_response::Codec;

    fn protocol() -> StreamProtocol {
        StreamProtocol::new(crate::domain::DEAL_PROTOCOL)
    }

    #[tokio::test]
    async fn test_read_response() {
        let response = DealResponse {
            accepted: true,
            message: String::new(),
        };
        let mut io = Cursor::new(response.to_cbor().unwrap());
        let decoded = DealCodec::default()
            .read_response(&protocol(), &mut io)
            .await
            .unwrap();
        assert_eq!(decoded, response);
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let response = DealResponse {
            accepted: false,
            message: "x".repeat(256),
        };
        let mut io = Cursor::new(response.to_cbor().unwrap());
        let err = DealCodec::new(64)
            .read_response(&protocol(), &mut io)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_inbound_refused() {
        let mut io = Cursor::new(Vec::new());
        let err = DealCodec::default()
            .read_request(&protocol(), &mut io)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
