//! Product analytics as structured `tracing` events under the `analytics`
//! target. Route them with `RUST_LOG=analytics=info`.

use tracing::info;

pub fn resume_upload(username: &str, file_name: &str, file_size: usize) {
    info!(
        target: "analytics",
        event = "resume_upload",
        category = "engagement",
        label = "resume_analysis",
        username,
        file_name,
        file_size,
    );
}

pub fn resume_analysis_complete(username: &str, score: Option<u8>) {
    info!(
        target: "analytics",
        event = "resume_analysis_complete",
        category = "engagement",
        label = "resume_analysis",
        username,
        score = score.unwrap_or(0),
        has_feedback = score.is_some(),
    );
}

#[derive(Debug, Clone, Copy)]
pub enum AuthAction {
    SignIn,
    SignOut,
}

impl AuthAction {
    fn as_str(&self) -> &'static str {
        match self {
            AuthAction::SignIn => "sign_in",
            AuthAction::SignOut => "sign_out",
        }
    }
}

pub fn user_authentication(action: AuthAction) {
    info!(
        target: "analytics",
        event = "user_authentication",
        category = "engagement",
        label = "user_management",
        action = action.as_str(),
    );
}
