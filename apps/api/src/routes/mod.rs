pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::auth::middleware::require_session;
use crate::notifications::handlers as notifications;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// Room for multipart framing and the text fields on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    // Everything here requires a session.
    let protected = Router::new()
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/stream",
            post(resumes::handle_stream_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        .route("/api/v1/resumes/:id/pdf", get(resumes::handle_resume_pdf))
        .route(
            "/api/v1/resumes/:id/image",
            get(resumes::handle_resume_image),
        )
        .route(
            "/api/v1/notifications",
            get(notifications::handle_list_notifications),
        )
        .route(
            "/api/v1/notifications/:id",
            delete(notifications::handle_dismiss_notification),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/auth/session", get(auth::handle_session))
        .merge(protected)
        .with_state(state)
}
