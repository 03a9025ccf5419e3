//! Error Types
//!
//! Client-side failure taxonomy. Views catch all of these at the call site;
//! none of them is fatal.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No active session")]
    NoSession,

    #[error("Session rejected by server")]
    SessionRejected,

    #[error("Auth service unavailable: {0}")]
    Unavailable(String),
}

/// Local validation errors, raised before any service call
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Expected {expected} file, got {actual}")]
    ContentType { expected: &'static str, actual: String },

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

/// Domain service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Status(status.as_u16())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Client-local storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level error for the client library
#[derive(Debug, Error)]
pub enum DecanatError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = DecanatError> = std::result::Result<T, E>;
