use std::sync::Arc;

use crate::analysis::client::FeedbackClient;
use crate::analysis::flow::ResumeAnalyzer;
use crate::analysis::rasterize::PdfRasterizer;
use crate::auth::{AuthProvider, Session};
use crate::config::Config;
use crate::kv::{KvStore, ScopedKv};
use crate::notifications::NotificationCenter;
use crate::resumes::repository::ResumeRepository;
use crate::storage::{BlobStore, ScopedBlobStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Unscoped store. Handlers go through [`AppState::records_for`].
    pub kv: Arc<dyn KvStore>,
    /// Unscoped store. Handlers go through [`AppState::files_for`].
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub feedback: Arc<dyn FeedbackClient>,
    pub rasterizer: Arc<dyn PdfRasterizer>,
    pub notifications: NotificationCenter,
    pub config: Config,
}

impl AppState {
    /// Records visible to the signed-in user.
    pub fn records_for(&self, session: &Session) -> ResumeRepository {
        ResumeRepository::new(Arc::new(ScopedKv::new(self.kv.clone(), &session.username)))
    }

    /// Blobs visible to the signed-in user.
    pub fn files_for(&self, session: &Session) -> Arc<dyn BlobStore> {
        Arc::new(ScopedBlobStore::new(self.blobs.clone(), &session.username))
    }

    pub fn analyzer_for(&self, session: &Session) -> ResumeAnalyzer {
        ResumeAnalyzer::new(
            self.files_for(session),
            self.records_for(session),
            self.rasterizer.clone(),
            self.feedback.clone(),
        )
    }
}
