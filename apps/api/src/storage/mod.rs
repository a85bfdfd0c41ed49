//! Blob storage adapter. Résumé PDFs and preview images live here; records
//! only keep the returned path.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod s3;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 error: {0}")]
    S3(String),

    #[error("Invalid blob key: {0}")]
    InvalidKey(String),
}

/// Reference to a stored blob, as returned by an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub path: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<StoredBlob, StorageError>;

    /// `Ok(None)` when nothing is stored under `path`.
    async fn get(&self, path: &str) -> Result<Option<Bytes>, StorageError>;

    /// Returns whether a blob was removed.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

/// Confines a [`BlobStore`] to one user's key prefix.
///
/// Paths handed out by `put` carry the prefix, and `get`/`delete` ignore any
/// path that does not.
pub struct ScopedBlobStore {
    inner: Arc<dyn BlobStore>,
    prefix: String,
}

impl ScopedBlobStore {
    pub fn new(inner: Arc<dyn BlobStore>, owner: &str) -> Self {
        Self {
            inner,
            prefix: format!("users/{owner}/"),
        }
    }

    fn owns(&self, path: &str) -> bool {
        path.starts_with(&self.prefix) && !has_parent_segment(path)
    }
}

/// True when a `/`-separated key climbs out of its directory. Dots inside a
/// segment (`John..Doe.pdf`) are fine.
fn has_parent_segment(key: &str) -> bool {
    key.split('/').any(|segment| segment == "..")
}

#[async_trait]
impl BlobStore for ScopedBlobStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        if key.is_empty() || key.starts_with('/') || has_parent_segment(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let full = format!("{}{}", self.prefix, key);
        self.inner.put(&full, body, content_type).await
    }

    async fn get(&self, path: &str) -> Result<Option<Bytes>, StorageError> {
        if !self.owns(path) {
            return Ok(None);
        }
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        if !self.owns(path) {
            return Ok(false);
        }
        self.inner.delete(path).await
    }
}

/// Reduces an uploaded file name to characters that are safe inside a key.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
