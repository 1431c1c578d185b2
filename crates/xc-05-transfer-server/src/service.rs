//! # Transfer Server
//!
//! Binds the router and serves until the shared cancellation token fires.
//! In-flight requests finish before [`TransferServer::run`] returns.

use std::net::SocketAddr;
use std::sync::Arc;

use shared_types::TargetDealSize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{TransferConfig, TransferError, TransferStore};
use crate::ports::PieceSource;
use crate::router::{build_router, AppState};

/// HTTP server for committed aggregates.
pub struct TransferServer {
    config: TransferConfig,
    state: AppState,
}

impl TransferServer {
    /// Create a server over a shared registry.
    pub fn new(
        config: TransferConfig,
        store: TransferStore,
        source: Arc<dyn PieceSource>,
        target: TargetDealSize,
    ) -> Self {
        Self {
            config,
            state: AppState {
                store,
                source,
                target,
            },
        }
    }

    /// Bind the configured address and serve.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), TransferError> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TransferError::Server(format!("bind {addr}: {e}")))?;
        self.serve(listener, cancel).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), TransferError> {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?local, "[xc-05] Transfer server listening");

        let router = build_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .map_err(|e| TransferError::Server(e.to_string()))?;

        info!("[xc-05] Transfer server stopped");
        Ok(())
    }
}
