//! # Commit Flow
//!
//! Offers enter the aggregation engine, the batch is committed on the
//! (mock) on-ramp, and the resulting transfer is served by the router.
//!
//! Sizes are scaled down from production: two 1 KiB offers against a
//! 2 KiB minimum take the same path as two 128 MiB offers against 256 MiB.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::{Method, StatusCode};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;
    use xc_03_aggregation::MockDealProposer;

    use crate::integration::fixtures::{offer_event, send, Pipeline};

    const DEAL: u64 = 2048;

    // =========================================================================
    // OFFER -> COMMIT -> TRANSFER
    // =========================================================================

    #[tokio::test]
    async fn test_two_offers_commit_and_serve_transfer_zero() {
        let pipeline = Pipeline::new(DEAL);
        let mut engine = pipeline.engine();
        let cancel = CancellationToken::new();

        assert!(engine.handle(offer_event(1, 1024), &cancel).await.unwrap().is_none());
        let outcome = engine
            .handle(offer_event(2, 1024), &cancel)
            .await
            .unwrap()
            .expect("second offer triggers the commit");

        let target = pipeline.target.get().get();
        assert_eq!(target, 2 * DEAL);
        assert_eq!(outcome.deal_size.get(), target);
        assert_eq!(outcome.transfer_id, 0);
        assert_eq!(pipeline.onramp.commits().len(), 1);

        let reply = send(pipeline.router(), Method::GET, "/?id=0").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_length(), Some(target - target / 128));
        assert_eq!(reply.body.len() as u64, target - target / 128);

        let head = send(pipeline.router(), Method::HEAD, "/?id=0").await;
        assert_eq!(head.status, StatusCode::OK);
        assert_eq!(head.content_length(), Some(target - target / 128));
        assert!(head.body.is_empty());
    }

    #[tokio::test]
    async fn test_materialized_file_matches_served_bytes() {
        let pipeline = Pipeline::new(DEAL);
        let mut engine = pipeline.engine();
        let cancel = CancellationToken::new();

        engine.handle(offer_event(1, 1024), &cancel).await.unwrap();
        let outcome = engine
            .handle(offer_event(2, 1024), &cancel)
            .await
            .unwrap()
            .unwrap();

        let file = tokio::fs::read(&outcome.file).await.unwrap();
        let reply = send(pipeline.router(), Method::GET, "/?id=0").await;
        assert_eq!(file, reply.body);
        assert!(outcome.file.starts_with(pipeline.dir.path()));
    }

    // =========================================================================
    // DROPPED OFFERS
    // =========================================================================

    #[tokio::test]
    async fn test_unpackable_offer_dropped_and_engine_keeps_running() {
        let pipeline = Pipeline::new(DEAL);
        let engine = pipeline.engine();
        let (queue, events) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(engine.run(events, cancel.clone()));

        // Too large for any aggregate at the current target.
        queue.send(offer_event(1, 4 * DEAL)).await.unwrap();
        queue.send(offer_event(2, 1024)).await.unwrap();
        queue.send(offer_event(3, 1024)).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while pipeline.onramp.commits().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let mut ids = pipeline.onramp.commits()[0].offer_ids.clone();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3]);
        assert!(!task.is_finished());

        cancel.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_dropped_offer_leaves_pending_total_unchanged() {
        let pipeline = Pipeline::new(4 * DEAL);
        let mut engine = pipeline.engine();
        let cancel = CancellationToken::new();

        engine.handle(offer_event(1, 1024), &cancel).await.unwrap();
        let before = engine.pending().total();

        assert!(engine
            .handle(offer_event(2, 16 * DEAL), &cancel)
            .await
            .unwrap()
            .is_none());
        assert_eq!(engine.pending().total(), before);
        assert_eq!(engine.pending().offer_ids(), vec![1]);
    }

    // =========================================================================
    // DEAL REJECTION
    // =========================================================================

    #[tokio::test]
    async fn test_rejected_deal_starts_next_cycle_empty() {
        let pipeline = Pipeline::new(DEAL);
        let deals = pipeline.rejecting_negotiator("insufficient collateral");
        let pipeline = pipeline.with_deals(deals);
        let mut engine = pipeline.engine();
        let cancel = CancellationToken::new();

        engine.handle(offer_event(1, 1024), &cancel).await.unwrap();
        let outcome = engine
            .handle(offer_event(2, 1024), &cancel)
            .await
            .unwrap()
            .unwrap();
        assert!(!outcome.deal_accepted);
        assert!(engine.pending().is_empty());

        // The transfer stays registered.
        assert!(pipeline.store.get(outcome.transfer_id).is_some());

        engine.handle(offer_event(3, 1024), &cancel).await.unwrap();
        assert_eq!(engine.pending().offer_ids(), vec![3]);
    }

    #[tokio::test]
    async fn test_deal_candidate_has_no_url_without_remote_store() {
        let deals = MockDealProposer::default();
        let pipeline = Pipeline::new(DEAL).with_deals(Arc::new(deals.clone()));
        let mut engine = pipeline.engine();
        let cancel = CancellationToken::new();

        engine.handle(offer_event(1, 1024), &cancel).await.unwrap();
        engine.handle(offer_event(2, 1024), &cancel).await.unwrap();

        let proposals = deals.proposals();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].transfer_id, 0);
        assert!(proposals[0].url.is_empty());
    }
}
