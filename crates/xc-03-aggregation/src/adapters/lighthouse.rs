//! # Lighthouse Remote Store
//!
//! Uploads materialized aggregates to Lighthouse and returns the gateway
//! URL the provider can fetch from.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::domain::{EngineError, UploadConfig};
use crate::ports::RemoteStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    name: String,
    hash: String,
    size: String,
}

/// Lighthouse `api/v0/add` client.
pub struct LighthouseStore {
    client: Client,
    endpoint: String,
    gateway: String,
    api_key: String,
}

impl LighthouseStore {
    /// Create a store from `config`, authenticating with `api_key`.
    pub fn new(config: &UploadConfig, api_key: impl Into<String>) -> Result<Self, EngineError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            gateway: config.gateway.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Public retrieval URL for a content hash.
    pub fn retrieval_url(&self, hash: &str) -> String {
        format!("{}/ipfs/{}", self.gateway, hash)
    }
}

#[async_trait]
impl RemoteStore for LighthouseStore {
    async fn upload(&self, path: &Path) -> Result<String, EngineError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| EngineError::Upload(format!("{}: {}", path.display(), e)))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| EngineError::Upload(format!("{}: {}", path.display(), e)))?
            .len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "aggregate".to_string());

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, length).file_name(name);
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/api/v0/add", self.endpoint))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EngineError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Upload(format!("status {}: {}", status, body)));
        }
        let added: AddResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Upload(format!("bad response: {}", e)))?;

        info!(
            name = %added.name,
            hash = %added.hash,
            size = %added.size,
            "[xc-03] Uploaded aggregate"
        );
        Ok(self.retrieval_url(&added.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::{HeaderMap, StatusCode};
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn lighthouse() -> String {
        let router = Router::new().route(
            "/api/v0/add",
            post(|headers: HeaderMap, mut multipart: Multipart| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if auth != "Bearer secret" {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                let field = multipart.next_field().await.unwrap().unwrap();
                assert_eq!(field.name(), Some("file"));
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.unwrap();
                Ok::<_, StatusCode>(Json::<Value>(json!({
                    "Name": name,
                    "Hash": format!("Qm{}", data.len()),
                    "Size": data.len().to_string(),
                })))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        url
    }

    fn config(endpoint: &str) -> UploadConfig {
        UploadConfig {
            endpoint: endpoint.to_string(),
            gateway: "https://gateway.lighthouse.storage/".to_string(),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_upload_returns_gateway_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baga6ea4seaq");
        tokio::fs::write(&path, vec![7u8; 4096]).await.unwrap();

        let endpoint = lighthouse().await;
        let store = LighthouseStore::new(&config(&endpoint), "secret").unwrap();
        let url = store.upload(&path).await.unwrap();
        assert_eq!(url, "https://gateway.lighthouse.storage/ipfs/Qm4096");
    }

    #[tokio::test]
    async fn test_rejected_key_is_upload_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agg");
        tokio::fs::write(&path, b"data").await.unwrap();

        let endpoint = lighthouse().await;
        let store = LighthouseStore::new(&config(&endpoint), "wrong").unwrap();
        let err = store.upload(&path).await.unwrap_err();
        assert!(matches!(err, EngineError::Upload(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_missing_file_is_upload_error() {
        let store = LighthouseStore::new(&config("http://127.0.0.1:1"), "secret").unwrap();
        let err = store.upload(Path::new("/nonexistent/agg")).await.unwrap_err();
        assert!(matches!(err, EngineError::Upload(_)));
    }
}
