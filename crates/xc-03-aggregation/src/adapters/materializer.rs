//! # Aggregate Materializer
//!
//! Streams a transfer's reconstructed payload into `<data_dir>/<name>`.
//! Bytes land in `<name>.part` first and are renamed once complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;
use xc_05_transfer_server::{PieceSource, Transfer};

use crate::domain::EngineError;

/// Writes aggregates to local disk.
pub struct Materializer {
    data_dir: PathBuf,
    source: Arc<dyn PieceSource>,
}

impl Materializer {
    /// Materializer rooted at `data_dir`, fetching pieces from `source`.
    pub fn new(data_dir: impl Into<PathBuf>, source: Arc<dyn PieceSource>) -> Self {
        Self {
            data_dir: data_dir.into(),
            source,
        }
    }

    /// Target directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Write `transfer` to `<data_dir>/<name>` and return the path.
    ///
    /// On any failure the partial file is removed.
    pub async fn write(&self, transfer: &Transfer, name: &str) -> Result<PathBuf, EngineError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| EngineError::Materialize(e.to_string()))?;
        let path = self.data_dir.join(name);
        let partial = self.data_dir.join(format!("{}.part", name));

        match self.write_partial(transfer, &partial, &path).await {
            Ok(written) => {
                info!(path = %path.display(), bytes = written, "[xc-03] Aggregate saved");
                Ok(path)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn write_partial(
        &self,
        transfer: &Transfer,
        partial: &Path,
        path: &Path,
    ) -> Result<u64, EngineError> {
        let err = |e: std::io::Error| EngineError::Materialize(e.to_string());

        let mut stream = transfer
            .object_stream(self.source.as_ref())
            .map_err(|e| EngineError::Materialize(e.to_string()))?;
        let file = tokio::fs::File::create(partial).await.map_err(err)?;
        let mut writer = BufWriter::new(file);

        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| EngineError::Materialize(format!("piece stream: {}", e)))?;
            writer.write_all(&chunk).await.map_err(err)?;
            written += chunk.len() as u64;
        }
        writer.flush().await.map_err(err)?;
        writer.into_inner().sync_all().await.map_err(err)?;

        let expected = transfer.content_length();
        if written != expected {
            return Err(EngineError::Materialize(format!(
                "wrote {} bytes, expected {}",
                written, expected
            )));
        }
        tokio::fs::rename(partial, path).await.map_err(err)?;
        Ok(written)
    }
}
