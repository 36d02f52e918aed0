// src/error.rs

//! Unified error handling for the indexer.

use std::fmt;

use thiserror::Error;

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Credentials missing or rejected by a platform
    #[error("Authentication error for {platform}: {message}")]
    Auth { platform: String, message: String },

    /// Network or non-success HTTP status
    #[error("Transport error for {context}: {message}")]
    Transport { context: String, message: String },

    /// Payload did not have the expected shape
    #[error("Malformed response for {context}: {message}")]
    MalformedResponse { context: String, message: String },

    /// Prior snapshot could not be read or parsed
    #[error("Failed to load snapshot {path}: {message}")]
    SnapshotLoad { path: String, message: String },

    /// No platform could be initialized
    #[error("Fatal configuration error: {0}")]
    FatalConfig(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built or used
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an authentication error for a platform.
    pub fn auth(platform: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Auth {
            platform: platform.into(),
            message: message.to_string(),
        }
    }

    /// Create a transport error with context.
    pub fn transport(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-response error with context.
    pub fn malformed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a snapshot load error.
    pub fn snapshot_load(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SnapshotLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error came from credentials being missing or rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
