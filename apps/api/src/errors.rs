use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::flow::AnalyzeError;
use crate::auth::AuthError;
use crate::kv::KvError;
use crate::resumes::repository::RepositoryError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Not a terminal failure: the client is expected to send the user
    /// through sign-in and come back to `redirect`'s `next`.
    #[error("Authentication required")]
    AuthRequired { redirect: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Analysis(#[from] AnalyzeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Key-value error: {0}")]
    Kv(#[from] KvError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidUsername(name) => {
                AppError::Validation(format!("Invalid username '{name}'"))
            }
            AuthError::InvalidAccessKey => AppError::Unauthorized("Invalid access key".to_string()),
            AuthError::Store(e) => AppError::Kv(e),
            AuthError::Corrupt(e) => AppError::Internal(anyhow::anyhow!("corrupt session: {e}")),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Kv(e) => AppError::Kv(e),
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::AuthRequired { .. } => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Sign in to continue".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Analysis(e) => {
                tracing::error!("Analysis flow failed: {e}");
                let status = match e {
                    AnalyzeError::Conversion(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, e.code(), e.notice().1.to_string())
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Kv(e) => {
                tracing::error!("Key-value error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "KV_ERROR",
                    "A data store error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let AppError::AuthRequired { redirect } = &self {
            body["error"]["redirect"] = json!(redirect);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_required_is_401() {
        let response = AppError::AuthRequired {
            redirect: "/auth?next=/resume/1".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_conversion_failure_is_422() {
        let response =
            AppError::Analysis(AnalyzeError::Conversion("no pages".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_access_key_maps_to_unauthorized() {
        let err: AppError = AuthError::InvalidAccessKey.into();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
