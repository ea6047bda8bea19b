use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Message(String),

    /// Non-2xx answer from the session API.
    #[error("Failed to {operation}: {status}")]
    Http { operation: String, status: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Contract violation: {0}")]
    Contract(String),

    #[error("Not authenticated")]
    Unauthenticated,
}

pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

impl AppError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Http { .. } | AppError::Transport(_))
    }

    /// Text shown to the user. Upstream failures collapse into a generic retry prompt.
    pub fn user_message(&self) -> String {
        if self.is_retryable() {
            RETRY_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::Message(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        AppError::Message(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Message(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        AppError::Transport(value.to_string())
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
