//! Error handling for the client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, ClientError>;

/// A failed HTTP request: the response status (when one arrived at all) and a
/// human-readable message extracted from the portal's JSON error envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RequestError {
    /// HTTP status code, `None` for network-level failures
    pub status: Option<u16>,
    /// Human-readable failure description
    pub message: String,
}

impl RequestError {
    /// A failure before any response arrived (DNS, connect, read errors)
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// A non-2xx response
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Main error type for the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration errors, including bad batch expansions
    #[error("Configuration error: {0}")]
    Config(String),

    /// A structural request failure that rejects a whole submission
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Form validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}
