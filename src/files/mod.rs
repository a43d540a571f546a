//! File registry
//!
//! A single JSON array of [`FileEntry`] metadata plus the directory holding
//! the uploaded binaries. Binary writes and registry writes are separate
//! steps: a crash between them leaves an orphaned binary behind.

mod model;
mod staging;

pub use model::{Audience, FileEntry};
pub use staging::{StagedUpload, StoredBinary};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::PortalError;
use crate::store::{DocumentStore, JsonDirStore, StoreError};

/// Document key of the registry array (`files.json` in the data directory)
const REGISTRY_KEY: &str = "files";

pub struct FileRegistry<S = JsonDirStore> {
    store: S,
    uploads_dir: PathBuf,
    lock: Mutex<()>,
}

impl<S: DocumentStore> FileRegistry<S> {
    pub fn new(store: S, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            uploads_dir: uploads_dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    async fn load(&self) -> Result<Vec<FileEntry>, PortalError> {
        let Some(doc) = self.store.get(REGISTRY_KEY).await? else {
            return Ok(Vec::new());
        };
        let entries = serde_json::from_value(doc).map_err(|source| StoreError::Corrupt {
            key: REGISTRY_KEY.to_string(),
            source,
        })?;
        Ok(entries)
    }

    async fn save(&self, entries: &[FileEntry]) -> Result<(), PortalError> {
        let doc = serde_json::to_value(entries).map_err(|source| StoreError::Corrupt {
            key: REGISTRY_KEY.to_string(),
            source,
        })?;
        self.store.put(REGISTRY_KEY, &doc).await?;
        Ok(())
    }

    /// The full registry in insertion order
    pub async fn list_all(&self) -> Result<Vec<FileEntry>, PortalError> {
        self.load().await
    }

    /// Public entries plus the private entries addressed to `admission_no`
    pub async fn list_visible(&self, admission_no: &str) -> Result<Vec<FileEntry>, PortalError> {
        let mut entries = self.load().await?;
        entries.retain(|entry| entry.is_visible_to(admission_no));
        Ok(entries)
    }

    /// Open a new binary in the uploads directory for streaming
    pub async fn stage(&self, raw_name: &str) -> Result<StagedUpload, PortalError> {
        Ok(StagedUpload::create(&self.uploads_dir, raw_name).await?)
    }

    /// Append the metadata for a binary that is already on disk
    pub async fn record(
        &self,
        binary: &StoredBinary,
        audience: Audience,
        admission_no: Option<String>,
    ) -> Result<FileEntry, PortalError> {
        let entry = FileEntry::new(
            binary.original_name.clone(),
            staging::public_path(&binary.stored_name),
            audience,
            admission_no,
        );

        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.push(entry.clone());
        self.save(&entries).await?;
        Ok(entry)
    }

    /// Remove the first entry whose original `filename` matches, and its binary.
    ///
    /// Later entries sharing the same original name are left untouched.
    pub async fn delete(&self, filename: &str) -> Result<FileEntry, PortalError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let index = entries
            .iter()
            .position(|entry| entry.filename == filename)
            .ok_or_else(PortalError::file_not_found)?;

        if let Some(stored_name) = entries[index].stored_name() {
            let binary = self.uploads_dir.join(stored_name);
            match tokio::fs::remove_file(&binary).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(StoreError::Io {
                        path: binary,
                        source,
                    }
                    .into())
                }
            }
        }

        let removed = entries.remove(index);
        self.save(&entries).await?;
        Ok(removed)
    }
}
