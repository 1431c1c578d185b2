//! # Event Watcher
//!
//! Keeps a live `DataReady` subscription on the on-ramp contract and forwards
//! each offer to the aggregation queue at most once per process lifetime.
//!
//! ```text
//! LogSource ──logs──> decode ──> dedup(OfferId) ──> mpsc::Sender (bounded)
//!     ^                                                  │
//!     └──── re-subscribe on transient error / end ───────┘ backpressure
//! ```
//!
//! The seen-id set belongs to the watcher, not to a subscription, so it
//! survives reconnects.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use shared_types::{DataReadyEvent, OfferId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use xchain_telemetry::{OFFERS_DUPLICATE, OFFERS_RECEIVED, WATCHER_RECONNECTS};

use crate::domain::{LogFilter, WatcherConfig, WatcherError};
use crate::ports::LogSource;

/// Why a single subscription stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The log stream finished.
    StreamEnded,
    /// The consumer went away.
    QueueClosed,
    /// Shutdown requested.
    Cancelled,
}

/// Deduplicating `DataReady` watcher.
pub struct EventWatcher {
    source: Arc<dyn LogSource>,
    filter: LogFilter,
    config: WatcherConfig,
    seen: Mutex<HashSet<OfferId>>,
}

impl EventWatcher {
    /// Create a watcher for `filter`.
    pub fn new(source: Arc<dyn LogSource>, filter: LogFilter, config: WatcherConfig) -> Self {
        Self {
            source,
            filter,
            config,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Number of distinct offers admitted so far.
    pub fn seen_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Record `offer_id`; false if it was already seen.
    fn admit(&self, offer_id: OfferId) -> bool {
        self.seen.lock().insert(offer_id)
    }

    /// Run until cancelled, the queue closes, or a fatal error occurs.
    ///
    /// Transient failures and finished streams lead to a new subscription
    /// after the configured reconnect delay, without limit.
    pub async fn run(
        &self,
        queue: mpsc::Sender<DataReadyEvent>,
        cancel: CancellationToken,
    ) -> Result<(), WatcherError> {
        loop {
            match self.watch(&queue, &cancel).await {
                Ok(SessionEnd::Cancelled) => {
                    info!("[xc-02] Cancelled, stopping event watcher");
                    return Ok(());
                }
                Ok(SessionEnd::QueueClosed) => {
                    info!("[xc-02] Aggregation queue closed, stopping event watcher");
                    return Ok(());
                }
                Ok(SessionEnd::StreamEnded) => {
                    info!("[xc-02] Subscription ended, reconnecting");
                }
                Err(e) if e.is_transient() => {
                    warn!(error = %e, "[xc-02] Transient subscription error, reconnecting");
                }
                Err(e) => return Err(e),
            }

            WATCHER_RECONNECTS.inc();
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.config.reconnect_delay()) => {}
            }
        }
    }

    async fn watch(
        &self,
        queue: &mpsc::Sender<DataReadyEvent>,
        cancel: &CancellationToken,
    ) -> Result<SessionEnd, WatcherError> {
        let mut logs = tokio::select! {
            _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
            logs = self.source.subscribe(&self.filter) => logs?,
        };

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
                next = logs.next() => next,
            };
            let Some(log) = next else {
                return Ok(SessionEnd::StreamEnded);
            };
            let log = log?;
            if log.removed {
                info!(tx = ?log.transaction_hash, "[xc-02] Ignoring removed log");
                continue;
            }

            let event = log.decode()?;
            if !self.admit(event.offer_id) {
                OFFERS_DUPLICATE.inc();
                info!(offer_id = event.offer_id, "[xc-02] Duplicate event ignored");
                continue;
            }

            let offer = &event.offer;
            info!(
                offer_id = event.offer_id,
                commitment = %hex::encode(&offer.commitment),
                size = offer.size,
                cid = %offer.cid,
                location = %offer.location,
                token = ?offer.token,
                amount = %offer.amount,
                "[xc-02] Sending offer for aggregation"
            );

            tokio::select! {
                _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
                sent = queue.send(event) => {
                    if sent.is_err() {
                        return Ok(SessionEnd::QueueClosed);
                    }
                }
            }
            OFFERS_RECEIVED.inc();
        }
    }
}
