//! # Outbound Ports
//!
//! Access to the source chain's log stream.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;

use crate::domain::{LogFilter, RawLog, WatcherError};

/// Stream of matching logs. Ends or errors when the subscription drops.
pub type LogStream = BoxStream<'static, Result<RawLog, WatcherError>>;

/// Source-chain log subscription - outbound port.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Start a fresh subscription for `filter`.
    async fn subscribe(&self, filter: &LogFilter) -> Result<LogStream, WatcherError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// One scripted subscription.
pub type Session = Vec<Result<RawLog, WatcherError>>;

/// Mock log source replaying scripted sessions.
///
/// Each `subscribe` consumes the next session. Once sessions run out the
/// returned stream stays open without yielding, so the watcher idles until
/// cancelled.
#[derive(Clone, Default)]
pub struct MockLogSource {
    sessions: Arc<Mutex<VecDeque<Session>>>,
    subscriptions: Arc<AtomicUsize>,
    /// Should fail?
    pub should_fail: bool,
}

impl MockLogSource {
    /// Source replaying `sessions` in order.
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions.into())),
            ..Default::default()
        }
    }

    /// Number of `subscribe` calls so far.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn subscribe(&self, _filter: &LogFilter) -> Result<LogStream, WatcherError> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(WatcherError::Subscription("Mock failure".to_string()));
        }
        match self.sessions.lock().pop_front() {
            Some(session) => Ok(stream::iter(session).boxed()),
            None => Ok(stream::pending().boxed()),
        }
    }
}
