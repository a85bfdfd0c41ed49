use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Session;
use crate::errors::AppError;
use crate::notifications::Toast;
use crate::state::AppState;

/// GET /api/v1/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<Vec<Toast>> {
    Json(state.notifications.list(&session.username))
}

/// DELETE /api/v1/notifications/:id
pub async fn handle_dismiss_notification(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.notifications.dismiss(&session.username, id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {id} not found")))
    }
}
