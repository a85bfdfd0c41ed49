use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{validate_username, AuthError, AuthProvider, Session};
use crate::kv::KvStore;

/// Sessions kept in the key-value store under `session:<token>`.
pub struct KvSessionAuth {
    kv: Arc<dyn KvStore>,
    ttl: Duration,
    access_key: Option<String>,
}

impl KvSessionAuth {
    pub fn new(kv: Arc<dyn KvStore>, ttl_hours: i64, access_key: Option<String>) -> Self {
        Self {
            kv,
            ttl: Duration::hours(ttl_hours.max(1)),
            access_key,
        }
    }

    fn key(token: &str) -> String {
        format!("session:{token}")
    }
}

#[async_trait]
impl AuthProvider for KvSessionAuth {
    async fn sign_in(
        &self,
        username: &str,
        access_key: Option<&str>,
    ) -> Result<Session, AuthError> {
        validate_username(username)?;
        if let Some(expected) = &self.access_key {
            if access_key != Some(expected.as_str()) {
                return Err(AuthError::InvalidAccessKey);
            }
        }

        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let payload = serde_json::to_string(&session)?;
        let expiry = self.ttl.to_std().unwrap_or(std::time::Duration::from_secs(3600));
        self.kv
            .set_with_ttl(&Self::key(&session.token), &payload, expiry)
            .await?;

        info!("Session issued for {username}");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        if self.kv.delete(&Self::key(token)).await? {
            info!("Session revoked");
        }
        Ok(())
    }

    async fn session(&self, token: &str) -> Result<Option<Session>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }
        let Some(payload) = self.kv.get(&Self::key(token)).await? else {
            return Ok(None);
        };
        let session: Session = serde_json::from_str(&payload)?;
        if session.expires_at <= Utc::now() {
            debug!("Session for {} expired", session.username);
            self.kv.delete(&Self::key(token)).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }
}
