//! DeepSeek Client Error Types
//!
//! Every fault the client can hit, plus the mapping that turns each one into
//! an [`ErrorInfo`] for the caller.

use crate::api::result::{codes, ErrorInfo};
use thiserror::Error;

/// Main error type for client operations
#[derive(Debug, Error)]
pub enum DeepSeekError {
    /// Model identifier is not in the allow-list
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Streaming decode requested for a request without `stream = true`
    #[error("Stream must be set to true for streaming requests")]
    StreamNotRequested,

    /// Configuration errors (missing API key, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// TCP/TLS connection to the endpoint failed
    #[error("Network error occurred: {0}")]
    Connection(String),

    /// Request or body read exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other HTTP-level failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Whole response body could not be parsed
    #[error("Error parsing API response: {0}")]
    Response(String),

    /// Body read failed after the stream had started
    #[error("Streaming error: {0}")]
    Stream(String),

    /// Caller cancelled the operation
    #[error("Request was cancelled")]
    Cancelled,

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeepSeekError {
    /// Stable error code reported in [`ErrorInfo::code`]
    pub fn code(&self) -> &'static str {
        match self {
            DeepSeekError::InvalidModel(_) => codes::VALIDATION_ERROR,
            DeepSeekError::StreamNotRequested => codes::USAGE_ERROR,
            DeepSeekError::Config(_) => codes::CONFIG_ERROR,
            DeepSeekError::Connection(_) => codes::CONNECTION_ERROR,
            DeepSeekError::Timeout(_) => codes::TIMEOUT_ERROR,
            DeepSeekError::Request(_) => codes::REQUEST_ERROR,
            DeepSeekError::Response(_) => codes::RESPONSE_PARSE_ERROR,
            DeepSeekError::Stream(_) => codes::STREAM_READ_ERROR,
            DeepSeekError::Cancelled => codes::REQUEST_CANCELLED,
            DeepSeekError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Synthetic HTTP status used when the fault never produced a real one
    pub fn status(&self) -> u16 {
        match self {
            DeepSeekError::InvalidModel(_) | DeepSeekError::StreamNotRequested => 400,
            _ => 500,
        }
    }

    /// Convert into the structured error handed to callers
    pub fn to_error_info(&self) -> ErrorInfo {
        let error_type = match self {
            DeepSeekError::InvalidModel(_) => "validation_error",
            _ => "client_error",
        };

        ErrorInfo::new(self.code(), self.to_string(), error_type)
    }
}

impl From<reqwest::Error> for DeepSeekError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeepSeekError::Timeout(err.to_string())
        } else if err.is_connect() {
            DeepSeekError::Connection(err.to_string())
        } else if err.is_decode() {
            DeepSeekError::Response(format!("Failed to decode response: {}", err))
        } else if err.is_body() {
            DeepSeekError::Stream(err.to_string())
        } else {
            DeepSeekError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DeepSeekError {
    fn from(err: serde_json::Error) -> Self {
        DeepSeekError::Response(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, DeepSeekError>;
