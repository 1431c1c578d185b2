//! # Node Runtime
//!
//! Runs the watcher, the aggregation engine and the transfer server as one
//! task group. The first task to fail cancels the shared token so the
//! others wind down; the group's result is that first failure.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use xc_02_event_watcher::WatcherError;
use xc_03_aggregation::EngineError;
use xc_05_transfer_server::TransferError;

use crate::container::SubsystemContainer;

/// Fatal error from one of the node's tasks.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Event watcher failed.
    #[error("event watcher: {0}")]
    Watcher(#[from] WatcherError),

    /// Aggregation engine failed.
    #[error("aggregation engine: {0}")]
    Engine(#[from] EngineError),

    /// Transfer server failed.
    #[error("transfer server: {0}")]
    Transfer(#[from] TransferError),

    /// A task panicked or was aborted.
    #[error("task did not complete: {0}")]
    Join(String),
}

/// The running node.
pub struct NodeRuntime {
    container: SubsystemContainer,
}

impl NodeRuntime {
    /// Runtime over a built container.
    pub fn new(container: SubsystemContainer) -> Self {
        Self { container }
    }

    /// Run every task until `cancel` fires or one of them fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), RuntimeError> {
        let SubsystemContainer {
            chain,
            watcher,
            engine,
            server,
            queue_capacity,
            ..
        } = self.container;
        info!(chain = %chain, "[node] Starting xchain node");

        let (queue, events) = mpsc::channel(queue_capacity);
        let mut tasks: JoinSet<(&'static str, Result<(), RuntimeError>)> = JoinSet::new();

        let token = cancel.clone();
        tasks.spawn(async move {
            let result = watcher.run(queue, token).await;
            ("watcher", result.map_err(RuntimeError::from))
        });
        let token = cancel.clone();
        tasks.spawn(async move {
            let result = engine.run(events, token).await;
            ("engine", result.map_err(RuntimeError::from))
        });
        let token = cancel.clone();
        tasks.spawn(async move {
            let result = server.run(token).await;
            ("server", result.map_err(RuntimeError::from))
        });

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let (task, result) = match joined {
                Ok(done) => done,
                Err(e) => ("unknown", Err(RuntimeError::Join(e.to_string()))),
            };
            match result {
                Ok(()) => info!(task, "[node] Task stopped"),
                Err(e) => {
                    error!(task, error = %e, "[node] Task failed, shutting down");
                    cancel.cancel();
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("[node] All tasks stopped");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{NodeConfig, Secrets};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn config(port: u16) -> NodeConfig {
        let mut config = NodeConfig::parse(
            r#"
payout_address = "0x1111111111111111111111111111111111111111"

[destination]
lotus_api = "http://127.0.0.1:1/rpc/v1"
prover_address = "0x2222222222222222222222222222222222222222"
provider_address = "t01000"

[sources.local]
api = "http://127.0.0.1:1"
on_ramp_address = "0x3333333333333333333333333333333333333333"
chain_id = 31337

[watcher]
poll_interval_ms = 50
reconnect_delay_ms = 50

[upload]
enabled = false
"#,
        )
        .unwrap();
        config.transfer.ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.transfer.port = port;
        config
    }

    fn container(port: u16) -> SubsystemContainer {
        let secrets = Secrets {
            signer_key: "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".into(),
            ..Default::default()
        };
        SubsystemContainer::build(&config(port), "local", &secrets)
            .map_err(|e| e.to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cancel_stops_all_tasks() {
        let runtime = NodeRuntime::new(container(0));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(runtime.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_first_failure_cancels_siblings() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let cancel = CancellationToken::new();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            NodeRuntime::new(container(port)).run(cancel.clone()),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(RuntimeError::Transfer(_))));
        assert!(cancel.is_cancelled());
        drop(taken);
    }
}
