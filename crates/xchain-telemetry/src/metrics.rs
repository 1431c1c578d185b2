//! Prometheus metrics for the bridge subsystems.
//!
//! All metrics follow the naming convention: `xc_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT WATCHER
    // =========================================================================

    /// Offers forwarded to the aggregation queue
    pub static ref OFFERS_RECEIVED: Counter = Counter::new(
        "xc_watcher_offers_received_total",
        "Offers admitted by the event watcher"
    ).expect("metric creation failed");

    /// Redelivered offers dropped by the dedup set
    pub static ref OFFERS_DUPLICATE: Counter = Counter::new(
        "xc_watcher_offers_duplicate_total",
        "Duplicate offers ignored by the event watcher"
    ).expect("metric creation failed");

    /// Subscription re-establishments after transient errors
    pub static ref WATCHER_RECONNECTS: Counter = Counter::new(
        "xc_watcher_reconnects_total",
        "Log subscription reconnects"
    ).expect("metric creation failed");

    // =========================================================================
    // AGGREGATION ENGINE
    // =========================================================================

    /// Offers the engine refused to batch
    pub static ref OFFERS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("xc_engine_offers_dropped_total", "Offers dropped by the aggregation engine"),
        &["reason"]  // reason: invalid_piece/unpackable
    ).expect("metric creation failed");

    /// Offers waiting in the pending batch
    pub static ref PENDING_OFFERS: Gauge = Gauge::new(
        "xc_engine_pending_offers",
        "Number of offers in the pending batch"
    ).expect("metric creation failed");

    /// Aggregates committed on chain
    pub static ref AGGREGATES_COMMITTED: Counter = Counter::new(
        "xc_engine_aggregates_committed_total",
        "Aggregates committed through the on-ramp contract"
    ).expect("metric creation failed");

    /// Current target deal size
    pub static ref TARGET_DEAL_SIZE: Gauge = Gauge::new(
        "xc_engine_target_deal_size_bytes",
        "Padded size aggregates are currently built to"
    ).expect("metric creation failed");

    /// End-to-end commit duration (commit, materialize, upload, deal)
    pub static ref COMMIT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "xc_engine_commit_duration_seconds",
            "Time spent committing one aggregate"
        ).buckets(exponential_buckets(0.5, 2.0, 12).expect("bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // DEAL NEGOTIATION
    // =========================================================================

    /// Deal proposals by outcome
    pub static ref DEAL_PROPOSALS: CounterVec = CounterVec::new(
        Opts::new("xc_deal_proposals_total", "Deal proposals sent to the storage provider"),
        &["outcome"]  // outcome: accepted/rejected/unsupported/cancelled/error
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSFER SERVER
    // =========================================================================

    /// Transfer requests by method and status
    pub static ref TRANSFER_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("xc_transfer_requests_total", "Transfer requests served"),
        &["method", "status"]
    ).expect("metric creation failed");

    /// Aggregate bytes streamed to clients
    pub static ref TRANSFER_BYTES: Counter = Counter::new(
        "xc_transfer_bytes_served_total",
        "Aggregate bytes streamed by the transfer server"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Watcher
        Box::new(OFFERS_RECEIVED.clone()),
        Box::new(OFFERS_DUPLICATE.clone()),
        Box::new(WATCHER_RECONNECTS.clone()),
        // Engine
        Box::new(OFFERS_DROPPED.clone()),
        Box::new(PENDING_OFFERS.clone()),
        Box::new(AGGREGATES_COMMITTED.clone()),
        Box::new(TARGET_DEAL_SIZE.clone()),
        Box::new(COMMIT_DURATION.clone()),
        // Deals
        Box::new(DEAL_PROPOSALS.clone()),
        // Transfers
        Box::new(TRANSFER_REQUESTS.clone()),
        Box::new(TRANSFER_BYTES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
