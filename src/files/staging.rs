//! Writing uploaded binaries into the uploads directory
//!
//! The payload is streamed to `<unix-millis>-<original name>` chunk by chunk.
//! Collisions are only avoided probabilistically by the timestamp prefix.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::store::StoreError;

/// Name used when the client sends no usable file name
const FALLBACK_NAME: &str = "upload.bin";

/// Reduce a client-supplied file name to its last path component
pub fn sanitize_filename(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Stored file name: millisecond timestamp, a dash, then the original name
pub fn stored_name_for(original: &str) -> String {
    format!("{}-{original}", Utc::now().timestamp_millis())
}

/// URL under which a stored binary is served
pub fn public_path(stored_name: &str) -> String {
    format!("/uploads/{stored_name}")
}

/// A binary being written to disk, not yet recorded in the registry
#[derive(Debug)]
pub struct StagedUpload {
    pub original_name: String,
    pub stored_name: String,
    path: PathBuf,
    file: File,
    bytes_written: u64,
}

impl StagedUpload {
    pub(super) async fn create(uploads_dir: &Path, raw_name: &str) -> Result<Self, StoreError> {
        let original_name = sanitize_filename(raw_name);
        let stored_name = stored_name_for(&original_name);
        let path = uploads_dir.join(&stored_name);
        let file = File::create(&path).await.map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            original_name,
            stored_name,
            path,
            file,
            bytes_written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StoreError> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|source| self.io_error(source))?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush the payload to disk
    pub async fn finish(mut self) -> Result<StoredBinary, StoreError> {
        self.file
            .flush()
            .await
            .map_err(|source| self.io_error(source))?;
        self.file
            .sync_all()
            .await
            .map_err(|source| self.io_error(source))?;
        Ok(StoredBinary {
            original_name: self.original_name,
            stored_name: self.stored_name,
            path: self.path,
            size: self.bytes_written,
        })
    }

    /// Drop a partially written payload
    pub async fn discard(self) {
        drop(self.file);
        remove_binary(&self.path).await;
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// A binary fully written to the uploads directory
#[derive(Debug, Clone)]
pub struct StoredBinary {
    pub original_name: String,
    pub stored_name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl StoredBinary {
    pub async fn discard(self) {
        remove_binary(&self.path).await;
    }
}

/// Best-effort removal; a missing file is fine
async fn remove_binary(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            crate::logger::log_warning(&format!(
                "Failed to remove upload '{}': {e}",
                path.display()
            ));
        }
    }
}
