//! Error types for the feed-update API client.
//!
//! # Design
//! Pre-flight failures (`Validation`, `Config`) are kept apart from
//! `Transport` failures so callers can pattern-match a recovery strategy:
//! the former are caller bugs and never worth retrying, the latter are
//! remote or environment conditions the caller may retry with backoff.
//! Non-2xx responses are surfaced with the raw status code and body; the
//! client does not interpret them further.

use thiserror::Error;

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure while executing an `HttpRequest`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a status outside 2xx.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS, timeout or I/O failure before a response was read.
    #[error("network error: {0}")]
    Network(String),
}

/// Errors returned by `YupdatesClient` and the `yapi` facade.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-contract input, detected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Required configuration (the API token) is missing.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body did not match the expected record shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
