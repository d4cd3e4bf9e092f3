use thiserror::Error;

/// Domain errors raised by path handling, entity construction and the effect runner.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("invalid property path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("cannot use key `{key}` on an array")]
    KeyOnArray { key: String },

    #[error("expected a JSON object, found {0}")]
    NotAnObject(String),

    #[error("action entity has no string `id`")]
    MissingId,

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("no executor registered for plugin `{0}`")]
    ExecutorNotFound(String),

    #[error("run of action {action_id} timed out after {timeout_ms}ms")]
    RunTimedOut { action_id: String, timeout_ms: u64 },
}

impl FormError {
    pub fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        FormError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
