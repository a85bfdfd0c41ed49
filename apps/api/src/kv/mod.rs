//! Key-value adapter. Records and sessions are stored as JSON strings.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod redis;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvItem {
    pub key: String,
    pub value: String,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Returns whether the value was stored.
    async fn set(&self, key: &str, value: &str) -> Result<bool, KvError>;

    /// Like [`KvStore::set`], but the store drops the key once `ttl` elapses.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, KvError>;

    /// Lists every entry whose key matches a glob `pattern` (`*`, `?`).
    async fn list(&self, pattern: &str) -> Result<Vec<KvItem>, KvError>;

    /// Returns whether a key was removed.
    async fn delete(&self, key: &str) -> Result<bool, KvError>;
}

/// Namespaces a [`KvStore`] per user so that `resume:*` only sees the
/// caller's own records.
pub struct ScopedKv {
    inner: Arc<dyn KvStore>,
    prefix: String,
}

impl ScopedKv {
    pub fn new(inner: Arc<dyn KvStore>, owner: &str) -> Self {
        Self {
            inner,
            prefix: format!("user:{owner}:"),
        }
    }

    fn scoped(&self, key: &str) -> Result<String, KvError> {
        if key.is_empty() {
            return Err(KvError::InvalidKey(key.to_string()));
        }
        Ok(format!("{}{}", self.prefix, key))
    }
}

#[async_trait]
impl KvStore for ScopedKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(&self.scoped(key)?).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool, KvError> {
        self.inner.set(&self.scoped(key)?, value).await
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, KvError> {
        self.inner.set_with_ttl(&self.scoped(key)?, value, ttl).await
    }

    async fn list(&self, pattern: &str) -> Result<Vec<KvItem>, KvError> {
        let items = self.inner.list(&self.scoped(pattern)?).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                item.key
                    .strip_prefix(&self.prefix)
                    .map(|key| KvItem {
                        key: key.to_string(),
                        value: item.value.clone(),
                    })
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        self.inner.delete(&self.scoped(key)?).await
    }
}
