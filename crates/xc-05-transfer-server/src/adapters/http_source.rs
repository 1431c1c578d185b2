//! # HTTP Piece Source
//!
//! Fetches pieces from their offer locations with `reqwest`.

use std::io;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;
use xc_01_data_segment::ByteStream;

use crate::ports::PieceSource;

/// Piece source backed by plain HTTP GETs.
#[derive(Debug, Clone, Default)]
pub struct HttpPieceSource {
    client: reqwest::Client,
}

impl HttpPieceSource {
    /// Source sharing an existing client's connection pool.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_io(e: reqwest::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

impl PieceSource for HttpPieceSource {
    fn open(&self, location: &str) -> ByteStream {
        let client = self.client.clone();
        let url = location.to_string();
        stream::once(async move {
            debug!(url = %url, "[xc-05] Fetching piece");
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(to_io)?;
            Ok::<_, io::Error>(response.bytes_stream().map_err(to_io))
        })
        .try_flatten()
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use xc_01_data_segment::algorithms::stream::collect;

    async fn spawn_piece_server() -> String {
        let app = Router::new()
            .route("/piece", get(|| async { "piece-bytes" }))
            .route(
                "/missing",
                get(|| async { (axum::http::StatusCode::NOT_FOUND, "gone") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetches_piece() {
        let base = spawn_piece_server().await;
        let source = HttpPieceSource::default();
        let bytes = collect(source.open(&format!("{base}/piece"))).await.unwrap();
        assert_eq!(bytes, b"piece-bytes");
    }

    #[tokio::test]
    async fn test_http_error_status_is_stream_error() {
        let base = spawn_piece_server().await;
        let source = HttpPieceSource::default();
        assert!(collect(source.open(&format!("{base}/missing"))).await.is_err());
    }

    #[tokio::test]
    async fn test_open_is_lazy() {
        // Nothing listens here; opening must still succeed.
        let source = HttpPieceSource::default();
        let stream = source.open("http://127.0.0.1:1/never");
        drop(stream);
    }
}
