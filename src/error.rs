//! Error handling for the Reelhouse client

use std::fmt;

use reelhouse_auth::AuthError;
use reelhouse_postgrest::PostgrestError;
use reelhouse_storage::StorageError;
use thiserror::Error;

/// Unified error type for the Reelhouse client
#[derive(Error, Debug)]
pub enum Error {
    /// Sign-in, sign-out and session errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Table API errors
    #[error("Database error: {0}")]
    Database(#[from] PostgrestError),

    /// Upload errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading local files, e.g. an image to upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    /// Signed in, but not allowed in
    #[error("{0}")]
    Unauthorized(String),

    /// The owning view went away before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    pub fn unauthorized<T: fmt::Display>(msg: T) -> Self {
        Error::Unauthorized(msg.to_string())
    }

    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// The text a notice should carry: the backend's own message when there
    /// is one, otherwise the error itself.
    pub fn notice_text(&self) -> String {
        match self {
            Error::Auth(e) => e.message(),
            Error::Database(e) => e.api_message(),
            Error::Storage(e) => e.message(),
            Error::Validation(msg)
            | Error::Unauthorized(msg)
            | Error::General(msg)
            | Error::Config(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text_passes_backend_message_through() {
        let err = Error::from(AuthError::ApiError("Invalid login credentials".to_string()));
        assert_eq!(err.notice_text(), "Invalid login credentials");

        let err = Error::from(StorageError::ApiError("Bucket not found".to_string()));
        assert_eq!(err.notice_text(), "Bucket not found");

        let err = Error::unauthorized("You don't have admin access");
        assert_eq!(err.notice_text(), "You don't have admin access");
    }

    #[test]
    fn test_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::general("x").is_cancelled());
    }
}
