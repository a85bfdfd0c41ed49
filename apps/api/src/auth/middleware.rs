use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::auth::SESSION_COOKIE;
use crate::errors::AppError;
use crate::state::AppState;

/// Session token from `Authorization: Bearer <token>`, else from the cookie.
pub fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    bearer
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

/// Gate for protected routes. Resolves the session into request extensions,
/// or answers with a sign-in redirect back to the requested path.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(request.headers(), &jar) {
        if let Some(session) = state.auth.session(&token).await? {
            request.extensions_mut().insert(session);
            return Ok(next.run(request).await);
        }
    }

    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    debug!("No session for {path}, asking for sign-in");
    Err(AppError::AuthRequired {
        redirect: format!("/auth?next={path}"),
    })
}
