//! # Client Error Types
//!
//! Unified error handling for the client facade, the batch layer, and the
//! bundled transport adapter.

use thiserror::Error;

use crate::transport::Verb;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing {verb} adapter method")]
    MissingAdapterMethod { verb: Verb },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an API error from an HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create a missing-adapter-method error for a specific verb
    pub fn missing_adapter_method(verb: Verb) -> Self {
        Self::MissingAdapterMethod { verb }
    }

    /// Check whether this error came from an unbound or partial adapter
    #[must_use]
    pub fn is_missing_adapter_method(&self) -> bool {
        matches!(self, ClientError::MissingAdapterMethod { .. })
    }
}
