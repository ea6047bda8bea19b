use crate::error::AppError;
use crate::models::common::SuccessResponse;
use crate::state::AppState;

pub fn login(state: &AppState, api_key: &str) -> Result<SuccessResponse, AppError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(AppError::Message("API key cannot be empty".to_string()));
    }
    state.credentials.set_api_key(key)?;
    state.api.set_api_key(Some(key.to_string()));
    tracing::info!("api key stored");
    Ok(SuccessResponse::ok("Logged in"))
}

/// Forgets the key and drops whatever activity the previous user left behind.
pub fn logout(state: &AppState) -> Result<SuccessResponse, AppError> {
    state.credentials.clear_api_key()?;
    state.api.set_api_key(None);
    state.activity.reset();
    tracing::info!("logged out");
    Ok(SuccessResponse::ok("Logged out"))
}

pub fn is_authenticated(state: &AppState) -> bool {
    state.credentials.is_authenticated()
}

pub(crate) fn require_auth(state: &AppState) -> Result<(), AppError> {
    if state.credentials.is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Unauthenticated)
    }
}
