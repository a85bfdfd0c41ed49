//! Session handling. Identity itself is delegated; this module only issues,
//! resolves and revokes session tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kv::KvError;

pub mod handlers;
pub mod middleware;
pub mod session;

pub const SESSION_COOKIE: &str = "resumex_session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid access key")]
    InvalidAccessKey,

    #[error("Session store error: {0}")]
    Store(#[from] KvError),

    #[error("Corrupt session payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// An active, authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub username: String,
}

/// What every route reads to decide whether to gate access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<UserRef>,
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            user: None,
        }
    }
}

impl From<&Session> for AuthState {
    fn from(session: &Session) -> Self {
        Self {
            is_authenticated: true,
            user: Some(UserRef {
                username: session.username.clone(),
            }),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, username: &str, access_key: Option<&str>)
        -> Result<Session, AuthError>;

    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// Resolves a token to its session; `None` when unknown or expired.
    async fn session(&self, token: &str) -> Result<Option<Session>, AuthError>;
}

/// Usernames end up inside storage keys, so the alphabet is restricted.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let valid = !username.is_empty()
        && username.len() <= 64
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && !username.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidUsername(username.to_string()))
    }
}

/// Only local paths are honoured as post-login destinations.
pub fn safe_redirect(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains("://") => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
