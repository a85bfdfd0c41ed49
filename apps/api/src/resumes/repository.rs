use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::kv::{KvError, KvStore};
use crate::resumes::record::{record_key, ResumeRecord, RECORD_PATTERN};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Kv(#[from] KvError),

    #[error("record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store refused write of {0}")]
    Rejected(String),
}

/// Résumé records as JSON documents under `resume:<id>`.
#[derive(Clone)]
pub struct ResumeRepository {
    kv: Arc<dyn KvStore>,
}

impl ResumeRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Writes (or overwrites) a record.
    pub async fn save(&self, record: &ResumeRecord) -> Result<(), RepositoryError> {
        let key = record.key();
        let payload = serde_json::to_string(record)?;
        if !self.kv.set(&key, &payload).await? {
            return Err(RepositoryError::Rejected(key));
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ResumeRecord>, RepositoryError> {
        let Some(payload) = self.kv.get(&record_key(id)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&payload)?))
    }

    /// All records. Entries that no longer parse are skipped, not fatal.
    pub async fn list(&self) -> Result<Vec<ResumeRecord>, RepositoryError> {
        let items = self.kv.list(RECORD_PATTERN).await?;
        let records = items
            .into_iter()
            .filter_map(|item| match serde_json::from_str::<ResumeRecord>(&item.value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable record {}: {e}", item.key);
                    None
                }
            })
            .collect();
        Ok(records)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.kv.delete(&record_key(id)).await?)
    }
}
