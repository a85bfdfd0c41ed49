//! In-memory adapters and fixtures shared by unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::analysis::client::{AiResponse, FeedbackClient, FeedbackClientError};
use crate::analysis::rasterize::{ConversionError, PdfRasterizer, RenderedImage};
use crate::auth::session::KvSessionAuth;
use crate::auth::{AuthProvider, Session};
use crate::config::Config;
use crate::kv::{KvError, KvItem, KvStore};
use crate::notifications::NotificationCenter;
use crate::state::AppState;
use crate::storage::{BlobStore, StorageError, StoredBlob};

/// Matches `*` (any run) and `?` (one char), like Redis `SCAN MATCH`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    fn go(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('*') => go(&p[1..], t) || (!t.is_empty() && go(p, &t[1..])),
            Some('?') => !t.is_empty() && go(&p[1..], &t[1..]),
            Some(c) => t.first() == Some(c) && go(&p[1..], &t[1..]),
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    go(&p, &t)
}

#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, String>>,
    ttls: Mutex<BTreeMap<String, Duration>>,
    refuse: AtomicBool,
}

impl MemoryKv {
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Expiry requested by the last `set_with_ttl` on `key`, if any.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.ttls.lock().unwrap().get(key).copied()
    }

    /// Every later `set` reports the value as not stored.
    pub fn refuse_writes(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool, KvError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.ttls.lock().unwrap().remove(key);
        Ok(true)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, KvError> {
        let stored = self.set(key, value).await?;
        if stored {
            self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        }
        Ok(stored)
    }

    async fn list(&self, pattern: &str) -> Result<Vec<KvItem>, KvError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, value)| KvItem {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        self.ttls.lock().unwrap().remove(key);
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, (Bytes, String)>>,
}

impl MemoryBlobStore {
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(StoredBlob {
            path: key.to_string(),
        })
    }

    async fn get(&self, path: &str) -> Result<Option<Bytes>, StorageError> {
        Ok(self.blobs.lock().unwrap().get(path).map(|(b, _)| b.clone()))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.lock().unwrap().remove(path).is_some())
    }
}

pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, key: &str, _: Bytes, _: &str) -> Result<StoredBlob, StorageError> {
        Err(StorageError::S3(format!("bucket unavailable for {key}")))
    }

    async fn get(&self, _: &str) -> Result<Option<Bytes>, StorageError> {
        Err(StorageError::S3("bucket unavailable".to_string()))
    }

    async fn delete(&self, _: &str) -> Result<bool, StorageError> {
        Err(StorageError::S3("bucket unavailable".to_string()))
    }
}

/// Stores normally, except that the `n`-th `put` (1-based) fails.
pub struct FailsOnPut {
    inner: MemoryBlobStore,
    failing_put: usize,
    puts: AtomicUsize,
}

impl FailsOnPut {
    pub fn nth(failing_put: usize) -> Self {
        Self {
            inner: MemoryBlobStore::default(),
            failing_put,
            puts: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl BlobStore for FailsOnPut {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.failing_put {
            return Err(StorageError::S3(format!("put #{attempt} of {key} refused")));
        }
        self.inner.put(key, body, content_type).await
    }

    async fn get(&self, path: &str) -> Result<Option<Bytes>, StorageError> {
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        self.inner.delete(path).await
    }
}

pub struct FakeRasterizer {
    image: bool,
}

impl FakeRasterizer {
    pub fn renders() -> Self {
        Self { image: true }
    }

    pub fn no_image() -> Self {
        Self { image: false }
    }
}

#[async_trait]
impl PdfRasterizer for FakeRasterizer {
    async fn render_first_page(
        &self,
        _pdf: Bytes,
    ) -> Result<Option<RenderedImage>, ConversionError> {
        if !self.image {
            return Ok(None);
        }
        Ok(Some(RenderedImage {
            png: Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"),
            width: 612,
            height: 792,
        }))
    }
}

pub struct FakeFeedback {
    reply: Option<AiResponse>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeFeedback {
    pub fn replies(response: AiResponse) -> Self {
        Self {
            reply: Some(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a backend that answered with nothing.
    pub fn silent() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(file_path, instructions)` for every call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackClient for FakeFeedback {
    async fn feedback(
        &self,
        file_path: &str,
        instructions: &str,
    ) -> Result<Option<AiResponse>, FeedbackClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((file_path.to_string(), instructions.to_string()));
        Ok(self.reply.clone())
    }
}

pub fn sample_pdf() -> Bytes {
    Bytes::from_static(b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n")
}

/// Handles into a test [`AppState`] built from in-memory adapters.
pub struct TestApp {
    pub state: AppState,
    pub kv: Arc<MemoryKv>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestApp {
    pub fn new(rasterizer: FakeRasterizer, feedback: FakeFeedback) -> Self {
        let config = Config::for_tests();
        let kv = Arc::new(MemoryKv::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        let auth = Arc::new(KvSessionAuth::new(
            kv.clone(),
            config.session_ttl_hours,
            config.access_key.clone(),
        ));
        let state = AppState {
            kv: kv.clone(),
            blobs: blobs.clone(),
            auth,
            feedback: Arc::new(feedback),
            rasterizer: Arc::new(rasterizer),
            notifications: NotificationCenter::new(Duration::from_millis(
                config.toast_duration_ms,
            )),
            config,
        };
        Self { state, kv, blobs }
    }

    pub async fn sign_in(&self, username: &str) -> Session {
        self.state.auth.sign_in(username, None).await.unwrap()
    }
}

#[test]
fn test_glob_match() {
    assert!(glob_match("resume:*", "resume:abc"));
    assert!(glob_match("user:ada:resume:*", "user:ada:resume:1"));
    assert!(!glob_match("user:ada:resume:*", "user:bob:resume:1"));
    assert!(glob_match("a?c", "abc"));
    assert!(!glob_match("a?c", "ac"));
}
