//! Document storage
//!
//! Records are stored as JSON documents addressed by a string key. The
//! `DocumentStore` trait is the only thing the student store and the file
//! registry see, so the JSON-directory backend can be replaced by a
//! transactional one without touching them.

mod json_dir;
mod locks;

pub use json_dir::JsonDirStore;
pub use locks::KeyLocks;

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt document '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Keyed JSON document storage.
///
/// Implementations perform no caching: `get` always reflects the latest
/// successful `put`. Read-modify-write atomicity is the caller's concern
/// (see [`KeyLocks`]).
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Fetch a document, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Create or fully replace a document
    async fn put(&self, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Remove a document, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// All documents with their keys, in backend order
    async fn list(&self) -> Result<Vec<(String, Value)>, StoreError>;
}
