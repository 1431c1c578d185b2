//! # Transfer HTTP Surface
//!
//! Status codes and repeatability of `GET|HEAD /?id=N` against transfers
//! registered by the engine.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use tokio_util::sync::CancellationToken;
    use xc_05_transfer_server::InMemoryPieceSource;

    use crate::integration::fixtures::{offer_event, send, Pipeline};

    const DEAL: u64 = 2048;

    async fn committed_pipeline() -> Pipeline {
        let source = InMemoryPieceSource::default()
            .with_piece("mem://1", vec![0xAAu8; 1016])
            .with_piece("mem://2", vec![0xBBu8; 600]);
        let pipeline = Pipeline::new(DEAL).with_source(Arc::new(source));
        let mut engine = pipeline.engine();
        let cancel = CancellationToken::new();
        engine.handle(offer_event(1, 1024), &cancel).await.unwrap();
        engine
            .handle(offer_event(2, 1024), &cancel)
            .await
            .unwrap()
            .expect("commit");
        pipeline
    }

    #[tokio::test]
    async fn test_missing_id_is_bad_request() {
        let pipeline = committed_pipeline().await;
        let reply = send(pipeline.router(), Method::GET, "/").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(String::from_utf8_lossy(&reply.body), "ID is required");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let pipeline = committed_pipeline().await;
        let reply = send(pipeline.router(), Method::GET, "/?id=zero").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unregistered_id_is_not_found() {
        let pipeline = committed_pipeline().await;
        let reply = send(pipeline.router(), Method::GET, "/?id=99").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8_lossy(&reply.body), "No data found");
    }

    #[tokio::test]
    async fn test_head_unregistered_id_uses_target_size() {
        let pipeline = committed_pipeline().await;
        let target = pipeline.target.get().get();
        let reply = send(pipeline.router(), Method::HEAD, "/?id=99").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_length(), Some(target - target / 128));
    }

    #[tokio::test]
    async fn test_repeated_gets_are_byte_identical() {
        let pipeline = committed_pipeline().await;

        let first = send(pipeline.router(), Method::GET, "/?id=0").await;
        assert_eq!(first.status, StatusCode::OK);
        for _ in 0..3 {
            let again = send(pipeline.router(), Method::GET, "/?id=0").await;
            assert_eq!(again.status, StatusCode::OK);
            assert_eq!(again.body, first.body);
        }

        let body = &first.body;
        assert!(body.windows(1016).any(|w| w.iter().all(|&b| b == 0xAA)));
        assert!(body.windows(600).any(|w| w.iter().all(|&b| b == 0xBB)));
    }

    #[tokio::test]
    async fn test_metrics_route() {
        let pipeline = committed_pipeline().await;
        let reply = send(pipeline.router(), Method::GET, "/metrics").await;
        assert_eq!(reply.status, StatusCode::OK);
    }
}
