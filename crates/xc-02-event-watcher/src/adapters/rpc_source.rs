//! # JSON-RPC Log Source
//!
//! Installs an `eth_newFilter` filter and polls `eth_getFilterChanges`.
//! Each `subscribe` installs a new filter; a filter the node has expired
//! surfaces as a transient error and the watcher re-subscribes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use shared_rpc::JsonRpcClient;
use tracing::{debug, info};

use crate::domain::{LogFilter, RawLog, WatcherError};
use crate::ports::{LogSource, LogStream};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterParams {
    address: Address,
    topics: Vec<Vec<B256>>,
    from_block: &'static str,
}

struct PollState {
    client: Arc<JsonRpcClient>,
    filter_id: String,
    interval: Duration,
    buffer: VecDeque<RawLog>,
    failed: bool,
}

/// Log source polling an EVM JSON-RPC endpoint.
pub struct JsonRpcLogSource {
    client: Arc<JsonRpcClient>,
    poll_interval: Duration,
}

impl JsonRpcLogSource {
    /// Create a source over a shared client.
    pub fn new(client: Arc<JsonRpcClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }
}

#[async_trait]
impl LogSource for JsonRpcLogSource {
    async fn subscribe(&self, filter: &LogFilter) -> Result<LogStream, WatcherError> {
        let params = FilterParams {
            address: filter.address,
            topics: vec![filter.topics.clone()],
            from_block: "latest",
        };
        let filter_id: String = self.client.call("eth_newFilter", [params]).await?;
        info!(
            filter_id = %filter_id,
            address = %filter.address,
            "[xc-02] Listening for DataReady events"
        );

        let state = PollState {
            client: Arc::clone(&self.client),
            filter_id,
            interval: self.poll_interval,
            buffer: VecDeque::new(),
            failed: false,
        };

        Ok(stream::unfold(state, |mut state| async move {
            loop {
                if state.failed {
                    return None;
                }
                if let Some(log) = state.buffer.pop_front() {
                    return Some((Ok(log), state));
                }
                tokio::time::sleep(state.interval).await;
                let changes = state
                    .client
                    .call::<_, Vec<RawLog>>("eth_getFilterChanges", [&state.filter_id])
                    .await;
                match changes {
                    Ok(logs) => {
                        if !logs.is_empty() {
                            debug!(count = logs.len(), "[xc-02] New logs");
                        }
                        state.buffer.extend(logs);
                    }
                    Err(e) => {
                        state.failed = true;
                        return Some((Err(e.into()), state));
                    }
                }
            }
        })
        .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn log_json() -> Value {
        json!({
            "address": "0x00000000000000000000000000000000000000aa",
            "topics": ["0x0000000000000000000000000000000000000000000000000000000000000001"],
            "data": "0x",
            "removed": false
        })
    }

    async fn rpc(State(polls): State<Arc<AtomicUsize>>, Json(req): Json<Value>) -> Json<Value> {
        let id = req["id"].clone();
        let body = match req["method"].as_str() {
            Some("eth_newFilter") => json!({"jsonrpc": "2.0", "id": id, "result": "0x1"}),
            Some("eth_getFilterChanges") => match polls.fetch_add(1, Ordering::SeqCst) {
                0 => json!({"jsonrpc": "2.0", "id": id, "result": [log_json(), log_json()]}),
                1 => json!({"jsonrpc": "2.0", "id": id, "result": []}),
                _ => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32000, "message": "filter not found"}
                }),
            },
            _ => json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32601, "message": "no"}}),
        };
        Json(body)
    }

    async fn spawn_node() -> String {
        let app = Router::new()
            .route("/", post(rpc))
            .with_state(Arc::new(AtomicUsize::new(0)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_polls_filter_changes_until_error() {
        let url = spawn_node().await;
        let client = Arc::new(JsonRpcClient::new(url).unwrap());
        let source = JsonRpcLogSource::new(client, Duration::from_millis(5));

        let items: Vec<_> = source
            .subscribe(&LogFilter::data_ready(Address::ZERO))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        let err = items[2].as_ref().unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transient() {
        let client = Arc::new(JsonRpcClient::new("http://127.0.0.1:1").unwrap());
        let source = JsonRpcLogSource::new(client, Duration::from_millis(5));
        let err = source
            .subscribe(&LogFilter::data_ready(Address::ZERO))
            .await
            .err()
            .unwrap();
        assert!(err.is_transient());
    }
}
