//! Error types for the remote client and configuration layer

use thiserror::Error;

/// Result type for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the healing service client
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Healing service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {details}")]
    Decode { details: String },

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: std::time::Duration },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ApiError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(details: impl Into<String>) -> Self {
        ApiError::Decode {
            details: details.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout: std::time::Duration) -> Self {
        ApiError::Timeout { timeout }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ApiError::Config {
            message: message.into(),
        }
    }

    /// Whether the failure happened before any response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Timeout { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::decode(err.to_string())
        } else {
            ApiError::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::decode(format!("JSON parsing error: {}", err))
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::config(format!("Invalid base URL: {}", err))
    }
}
