use thiserror::Error;

pub type AppealResult<T> = Result<T, AppealError>;

#[derive(Debug, Error)]
pub enum AppealError {
    /// Malformed submission: empty text or an unknown appeal type.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller is not in the administrator set.
    #[error("Access denied")]
    Unauthorized,

    /// Unknown id, or an appeal that already left `pending`. The store
    /// does not tell these apart on a conditional update.
    #[error("Appeal not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AppealError {
    fn from(e: anyhow::Error) -> Self {
        AppealError::Storage(e.to_string())
    }
}

/// Best-effort delivery failed. Never fails the enclosing operation.
#[derive(Debug, Error)]
#[error("failed to notify {target}: {reason}")]
pub struct NotificationError {
    pub target: i64,
    pub reason: String,
}
