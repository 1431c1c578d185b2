//! # Offer Redelivery
//!
//! Duplicate `DataReady` logs, within a subscription and across
//! reconnects, reach the aggregation engine at most once.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

    use alloy_primitives::Address;
    use proptest::prelude::*;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;
    use xc_02_event_watcher::{
        EventWatcher, LogFilter, MockLogSource, WatcherConfig, WatcherError,
    };

    use crate::integration::fixtures::{data_ready_log, Pipeline};

    fn watcher(source: &MockLogSource) -> EventWatcher {
        EventWatcher::new(
            Arc::new(source.clone()),
            LogFilter::data_ready(Address::ZERO),
            WatcherConfig {
                poll_interval_ms: 1,
                reconnect_delay_ms: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_redelivered_offer_committed_once() {
        let source = MockLogSource::new(vec![
            vec![
                data_ready_log(1, 1024),
                data_ready_log(1, 1024),
                Err(WatcherError::Subscription("read tcp: connection reset".into())),
            ],
            vec![data_ready_log(1, 1024), data_ready_log(2, 1024)],
        ]);
        let pipeline = Pipeline::new(2048);
        let (queue, events) = mpsc::channel(4);
        let cancel = CancellationToken::new();

        let watcher = watcher(&source);
        let watch = {
            let cancel = cancel.clone();
            tokio::spawn(async move { watcher.run(queue, cancel).await })
        };
        let engine = tokio::spawn(pipeline.engine().run(events, cancel.clone()));

        tokio::time::timeout(Duration::from_secs(5), async {
            while pipeline.onramp.commits().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        cancel.cancel();
        watch.await.unwrap().unwrap();
        engine.await.unwrap().unwrap();

        let commits = pipeline.onramp.commits();
        assert_eq!(commits.len(), 1);
        let mut ids = commits[0].offer_ids.clone();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert!(source.subscriptions() >= 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_each_offer_id_admitted_once(ids in prop::collection::vec(0u64..12, 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let source = MockLogSource::new(vec![
                    ids.iter().map(|&id| data_ready_log(id, 1024)).collect(),
                ]);
                let unique: BTreeSet<u64> = ids.iter().copied().collect();
                let (queue, mut events) = mpsc::channel(ids.len());
                let cancel = CancellationToken::new();

                let watcher = watcher(&source);
                let run = {
                    let cancel = cancel.clone();
                    tokio::spawn(async move { watcher.run(queue, cancel).await })
                };

                let mut admitted = Vec::new();
                for _ in 0..unique.len() {
                    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
                        .await
                        .unwrap()
                        .unwrap();
                    admitted.push(event.offer_id);
                }
                cancel.cancel();
                run.await.unwrap().unwrap();
                prop_assert!(events.try_recv().is_err());

                let mut first_seen = Vec::new();
                for id in &ids {
                    if !first_seen.contains(id) {
                        first_seen.push(*id);
                    }
                }
                prop_assert_eq!(admitted, first_seen);
                Ok(())
            })?;
        }
    }
}
