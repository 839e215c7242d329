//! Unified error types for gsheet core.

use std::net::SocketAddr;

use gsheet_types::{AuthError, ConfigError};
use thiserror::Error;

/// Main error type for all gsheet operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Credentials file, config directory, or flag problem.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Interactive authorization flow failed.
    #[error("OAuth error: {0}")]
    Auth(#[from] AuthError),

    /// Local callback listener could not be bound.
    #[error("error starting server on {addr}: {source}")]
    CallbackBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Browser opener process could not be run or exited non-zero.
    #[error("error running `{command}`: {message}")]
    Browser { command: String, message: String },

    /// Remote API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network request failed (HTTP client).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// The typed auth error, if this is one.
    pub fn as_auth(&self) -> Option<&AuthError> {
        match self {
            AppError::Auth(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for gsheet operations.
pub type AppResult<T> = Result<T, AppError>;
