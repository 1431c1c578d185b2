//! # HTTP Routes
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /?id=N` | stream transfer `N` |
//! | `HEAD /?id=N` | headers only, always 200 |
//! | `GET /metrics` | Prometheus text |

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::stream::StreamExt;
use serde::Deserialize;
use shared_types::{TargetDealSize, TransferId};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use xc_01_data_segment::ByteStream;
use xchain_telemetry::{TRANSFER_BYTES, TRANSFER_REQUESTS};

use crate::domain::{Transfer, TransferError, TransferStore};
use crate::ports::PieceSource;

const OCTET_STREAM: &str = "application/octet-stream";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry of committed aggregates.
    pub store: TransferStore,
    /// Where piece bytes come from.
    pub source: Arc<dyn PieceSource>,
    /// Current target deal size.
    pub target: TargetDealSize,
}

/// Query string of the transfer routes.
#[derive(Debug, Deserialize)]
pub struct TransferQuery {
    /// Transfer id, unparsed.
    pub id: Option<String>,
}

impl TransferQuery {
    fn transfer_id(&self) -> Result<TransferId, TransferError> {
        let raw = self.id.as_deref().ok_or(TransferError::MissingId)?;
        raw.parse()
            .map_err(|_| TransferError::InvalidId(raw.to_string()))
    }
}

impl IntoResponse for TransferError {
    fn into_response(self) -> Response {
        let status = match self {
            TransferError::MissingId | TransferError::InvalidId(_) => StatusCode::BAD_REQUEST,
            TransferError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Build the transfer router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_transfer).head(head_transfer))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn record(method: &Method, status: StatusCode) {
    TRANSFER_REQUESTS
        .with_label_values(&[method.as_str(), status.as_str()])
        .inc();
}

fn octet_stream(content_length: u64, body: Body) -> Response {
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));
    response
}

fn open_transfer(
    state: &AppState,
    query: &TransferQuery,
) -> Result<(Arc<Transfer>, ByteStream), TransferError> {
    let id = query.transfer_id()?;
    let transfer = state.store.get(id).ok_or(TransferError::NotFound(id))?;
    let stream = transfer.object_stream(state.source.as_ref())?;
    Ok((transfer, stream))
}

async fn get_transfer(State(state): State<AppState>, Query(query): Query<TransferQuery>) -> Response {
    let result = open_transfer(&state, &query);
    match result {
        Ok((transfer, stream)) => {
            debug!(transfer_id = transfer.id, "[xc-05] Serving transfer");
            record(&Method::GET, StatusCode::OK);
            let counted = stream.inspect(|chunk| {
                if let Ok(bytes) = chunk {
                    TRANSFER_BYTES.inc_by(bytes.len() as f64);
                }
            });
            octet_stream(transfer.content_length(), Body::from_stream(counted))
        }
        Err(e) => {
            if !e.is_client_error() {
                warn!(error = %e, "[xc-05] Transfer failed");
            }
            let response = e.into_response();
            record(&Method::GET, response.status());
            response
        }
    }
}

async fn head_transfer(State(state): State<AppState>, Query(query): Query<TransferQuery>) -> Response {
    let content_length = query
        .transfer_id()
        .ok()
        .and_then(|id| state.store.get(id))
        .map(|transfer| transfer.content_length())
        .unwrap_or_else(|| state.target.get().unpadded());
    record(&Method::HEAD, StatusCode::OK);
    octet_stream(content_length, Body::empty())
}

async fn metrics() -> Response {
    match xchain_telemetry::encode_metrics() {
        Ok(text) => text.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
