//! Service Results
//!
//! Tagged success/failure outcome returned from every decode boundary.

use crate::error::DeepSeekError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error codes produced by the client itself
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const USAGE_ERROR: &str = "USAGE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const CONNECTION_ERROR: &str = "CONNECTION_ERROR";
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";
    pub const REQUEST_ERROR: &str = "REQUEST_ERROR";
    pub const RESPONSE_PARSE_ERROR: &str = "RESPONSE_PARSE_ERROR";
    pub const STREAM_READ_ERROR: &str = "STREAM_READ_ERROR";
    pub const JSON_PARSE_ERROR: &str = "JSON_PARSE_ERROR";
    pub const REQUEST_CANCELLED: &str = "REQUEST_CANCELLED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Outcome of a single call or a single streamed chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ServiceResult<T> {
    /// Decoded payload and the HTTP status it arrived with
    Success { data: T, status: u16 },

    /// Structured error and the HTTP status (real or synthetic)
    Failure { error: ErrorInfo, status: u16 },
}

impl<T> ServiceResult<T> {
    pub fn success(data: T, status: u16) -> Self {
        ServiceResult::Success { data, status }
    }

    pub fn failure(error: ErrorInfo, status: u16) -> Self {
        ServiceResult::Failure { error, status }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResult::Success { .. })
    }

    /// HTTP status code carried by either variant
    pub fn status(&self) -> u16 {
        match self {
            ServiceResult::Success { status, .. } | ServiceResult::Failure { status, .. } => *status,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ServiceResult::Success { data, .. } => Some(data),
            ServiceResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ServiceResult::Success { .. } => None,
            ServiceResult::Failure { error, .. } => Some(error),
        }
    }

    /// Drop the status and convert into a plain `Result`
    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match self {
            ServiceResult::Success { data, .. } => Ok(data),
            ServiceResult::Failure { error, .. } => Err(error),
        }
    }

    /// Map the success payload, keeping the status
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResult<U> {
        match self {
            ServiceResult::Success { data, status } => ServiceResult::Success {
                data: f(data),
                status,
            },
            ServiceResult::Failure { error, status } => ServiceResult::Failure { error, status },
        }
    }
}

impl<T> From<DeepSeekError> for ServiceResult<T> {
    fn from(err: DeepSeekError) -> Self {
        ServiceResult::failure(err.to_error_info(), err.status())
    }
}

/// Error details, either from the upstream body or synthesized locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawErrorInfo")]
pub struct ErrorInfo {
    /// Error code identifier
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Error type/category
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorInfo {
    pub const UNKNOWN_CODE: &'static str = "unknown";
    pub const UNKNOWN_TYPE: &'static str = "unknown";
    pub const UNKNOWN_MESSAGE: &'static str = "Unknown error occurred";

    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        error_type: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            error_type: error_type.into(),
        }
    }

    /// Error used when an upstream error body cannot be parsed at all
    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN_CODE, Self::UNKNOWN_MESSAGE, Self::UNKNOWN_TYPE)
    }

    /// Error for a single streamed line that is not valid chunk JSON
    pub fn json_parse(err: &serde_json::Error) -> Self {
        Self::new(
            codes::JSON_PARSE_ERROR,
            format!("Error parsing streaming response: {}", err),
            "client_error",
        )
    }

    /// Parse an upstream error body.
    ///
    /// Accepts both the flat `{code, message, type}` shape and the
    /// OpenAI-style `{"error": {...}}` envelope. Returns `None` when the body
    /// is not a JSON object of either shape.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<ErrorEnvelope>(body).ok()? {
            ErrorEnvelope::Wrapped { error } => Some(error),
            ErrorEnvelope::Flat(info) => Some(info),
        }
    }
}

impl Default for ErrorInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Wrapped { error: ErrorInfo },
    Flat(ErrorInfo),
}

/// Wire form of [`ErrorInfo`]; every field may be absent, null, or numeric.
#[derive(Deserialize)]
struct RawErrorInfo {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default, rename = "type")]
    error_type: Option<Value>,
}

impl From<RawErrorInfo> for ErrorInfo {
    fn from(raw: RawErrorInfo) -> Self {
        Self {
            code: text_or(raw.code, ErrorInfo::UNKNOWN_CODE),
            message: text_or(raw.message, ErrorInfo::UNKNOWN_MESSAGE),
            error_type: text_or(raw.error_type, ErrorInfo::UNKNOWN_TYPE),
        }
    }
}

fn text_or(value: Option<Value>, sentinel: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => sentinel.to_string(),
    }
}
