use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::analytics::{self, AuthAction};
use crate::auth::middleware::session_token;
use crate::auth::{safe_redirect, AuthState, SESSION_COOKIE};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub username: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub username: String,
    pub redirect: String,
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>), AppError> {
    let session = state
        .auth
        .sign_in(req.username.trim(), req.access_key.as_deref())
        .await?;
    analytics::user_authentication(AuthAction::SignIn);

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            token: session.token,
            username: session.username,
            redirect: safe_redirect(req.next.as_deref()),
        }),
    ))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<AuthState>), AppError> {
    if let Some(token) = session_token(&headers, &jar) {
        state.auth.sign_out(&token).await?;
        analytics::user_authentication(AuthAction::SignOut);
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(AuthState::anonymous())))
}

/// GET /api/v1/auth/session
pub async fn handle_session(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<AuthState>, AppError> {
    let Some(token) = session_token(&headers, &jar) else {
        return Ok(Json(AuthState::anonymous()));
    };
    let auth_state = match state.auth.session(&token).await? {
        Some(session) => AuthState::from(&session),
        None => AuthState::anonymous(),
    };
    Ok(Json(auth_state))
}
