//! # XChain Telemetry
//!
//! Observability for the bridge daemon.
//!
//! ## Components
//!
//! - **Logs**: `tracing` subscriber with pretty or JSON formatting
//! - **Traces**: optional OpenTelemetry OTLP export
//! - **Metrics**: Prometheus counters, served by the transfer server
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xchain_telemetry::{TelemetryConfig, init_telemetry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).await.expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` | OTLP endpoint |
//! | `OTEL_SERVICE_NAME` | `xchain-node` | Service name in traces |
//! | `XC_OTLP_ENABLED` | `false` | Export spans |
//! | `XC_LOG_LEVEL` | `info` | Log level filter |
//! | `XC_JSON_LOGS` | `false` | JSON log lines |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, AGGREGATES_COMMITTED, COMMIT_DURATION, DEAL_PROPOSALS,
    OFFERS_DROPPED, OFFERS_DUPLICATE, OFFERS_RECEIVED, PENDING_OFFERS, TARGET_DEAL_SIZE,
    TRANSFER_BYTES, TRANSFER_REQUESTS, WATCHER_RECONNECTS,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber or exporter could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracerInit(String),

    /// Prometheus registry failure.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging, tracing and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, it flushes pending spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let tracing_guard = tracing_setup::init_tracing(&config).await?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
