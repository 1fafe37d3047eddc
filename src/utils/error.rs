//! Error types and handling
//!
//! Common error types used across the monitor client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-wide error type
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitorError::Timeout
        } else if err.is_decode() {
            MonitorError::MalformedResponse(err.to_string())
        } else {
            MonitorError::Transport(err.to_string())
        }
    }
}

/// Error payload shown to the user in a failure notice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<MonitorError> for ErrorResponse {
    fn from(error: MonitorError) -> Self {
        let code = match &error {
            MonitorError::Io(_) => "IO_ERROR",
            MonitorError::Serialization(_) => "SERIALIZATION_ERROR",
            MonitorError::Transport(_) => "TRANSPORT_ERROR",
            MonitorError::Timeout => "TIMEOUT",
            MonitorError::Status(_) => "STATUS_ERROR",
            MonitorError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            MonitorError::Recording(_) => "RECORDING_ERROR",
            MonitorError::Config(_) => "CONFIG_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using MonitorError
pub type MonitorResult<T> = Result<T, MonitorError>;
