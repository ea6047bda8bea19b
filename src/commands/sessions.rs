use crate::commands::auth::require_auth;
use crate::error::AppError;
use crate::models::common::SuccessResponse;
use crate::models::session::{CreateSessionRequest, Session};
use crate::state::AppState;

pub async fn list_sessions(state: &AppState) -> Result<Vec<Session>, AppError> {
    require_auth(state)?;
    let sessions = state.api.list_sessions().await?;
    tracing::info!(count = sessions.len(), "listed sessions");
    Ok(sessions)
}

pub async fn create_session(state: &AppState, title: &str) -> Result<Session, AppError> {
    require_auth(state)?;
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Message("Session title cannot be empty".to_string()));
    }
    let session = state
        .api
        .create_session(&CreateSessionRequest {
            title: title.to_string(),
        })
        .await?;
    tracing::info!(session_id = %session.id, "created session");
    Ok(session)
}

pub async fn delete_session(state: &AppState, session_id: &str) -> Result<SuccessResponse, AppError> {
    require_auth(state)?;
    state.api.delete_session(session_id).await?;
    tracing::info!(session_id, "deleted session");
    Ok(SuccessResponse::ok(format!("Session {session_id} deleted")))
}

pub async fn open_session(state: &AppState, session_id: &str) -> Result<Session, AppError> {
    require_auth(state)?;
    let session = state.api.get_session(session_id).await?;
    tracing::info!(session_id = %session.id, "opened session");
    Ok(session)
}

/// Starts a fresh turn; the activity view forgets everything from the previous one.
pub fn new_conversation(state: &AppState) {
    state.activity.reset();
}
