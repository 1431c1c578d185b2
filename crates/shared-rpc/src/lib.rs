//! # Shared JSON-RPC Client
//!
//! Minimal JSON-RPC 2.0 over HTTP, shared by the EVM adapters (event
//! watcher, on-ramp commit) and the destination-chain adapter used during
//! deal negotiation.
//!
//! ```rust,ignore
//! let client = JsonRpcClient::new("http://localhost:8545")?;
//! let block: String = client.call("eth_blockNumber", [(); 0]).await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to a JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum RpcError {
    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// Error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The response body was not a valid JSON-RPC response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl RpcError {
    /// True for failures of the underlying connection rather than of the call.
    pub fn is_transport(&self) -> bool {
        match self {
            RpcError::Connection(_) => true,
            RpcError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            _ => false,
        }
    }
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC client bound to one endpoint.
pub struct JsonRpcClient {
    client: Client,
    url: String,
    bearer: Option<String>,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(RpcError::Http)?;

        Ok(Self {
            client,
            url: url.into(),
            bearer: None,
            request_id: AtomicU64::new(1),
        })
    }

    /// Send `Authorization: Bearer <token>` with every call.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer = (!token.is_empty()).then_some(token);
        self
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call `method` and decode a non-null result.
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| RpcError::Parse(format!("Missing result for {}", method)))
    }

    /// Call `method`; a `null` result decodes to `None`.
    pub async fn call_optional<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, RpcError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        tracing::trace!(method, url = %self.url, "json-rpc call");

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                RpcError::Connection(format!("Cannot connect to {}", self.url))
            } else {
                RpcError::Http(e)
            }
        })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::Parse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(value: &str) -> Result<u64, RpcError> {
    let digits = value.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|e| RpcError::Parse(format!("{}: {}", value, e)))
}

/// Format a `0x`-prefixed hex quantity.
pub fn format_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}
