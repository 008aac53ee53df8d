//! Client error types
//!
//! Every failure, whatever its origin (transport, HTTP status, local
//! validation, storage), is normalized into one [`ClientError`] shape.
//! Callers branch on `kind` and the two flags rather than on transport
//! exceptions.

use std::time::Duration;

use reqwest::StatusCode;
use shared::error::{ErrorBody, ErrorCode, default_status_message, is_retryable_status};
use thiserror::Error;

/// Coarse classification of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response reached the client
    Network,
    /// Request timed out
    Timeout,
    /// Known offline, nothing was sent
    Offline,
    /// Caller released the request
    Cancelled,
    /// Non-success HTTP status (other than an unrecoverable 401)
    Http,
    /// 401 that was not recovered by a refresh
    Unauthorized,
    /// Refresh failed and the session was cleared
    SessionExpired,
    /// Client-side validation, never reached the network
    Validation,
    /// Body could not be decoded
    InvalidResponse,
    /// Local storage failure
    Storage,
    /// Bad configuration
    Config,
}

/// Client error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Server (or client) error code
    pub code: Option<String>,
    pub is_network_error: bool,
    pub is_retryable: bool,
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    fn local(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: Some(code.as_str().to_string()),
            is_network_error: false,
            is_retryable: false,
        }
    }

    /// Transport failure: the request never got a response
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            is_network_error: true,
            is_retryable: true,
            ..Self::local(ErrorKind::Network, ErrorCode::NetworkError, message)
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            is_network_error: true,
            is_retryable: true,
            ..Self::local(
                ErrorKind::Timeout,
                ErrorCode::TimeoutError,
                format!("Request timed out after {} ms", after.as_millis()),
            )
        }
    }

    /// Preflight failure, nothing was attempted
    pub fn offline() -> Self {
        Self {
            is_network_error: true,
            is_retryable: true,
            ..Self::local(ErrorKind::Offline, ErrorCode::Offline, ErrorCode::Offline.message())
        }
    }

    pub fn cancelled() -> Self {
        Self::local(
            ErrorKind::Cancelled,
            ErrorCode::Cancelled,
            ErrorCode::Cancelled.message(),
        )
    }

    /// Build from a non-success response
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed = ErrorBody::parse(body);
        let message = parsed
            .as_ref()
            .and_then(|b| b.message())
            .map(str::to_string)
            .unwrap_or_else(|| default_status_message(status));
        let kind = if status == StatusCode::UNAUTHORIZED {
            ErrorKind::Unauthorized
        } else {
            ErrorKind::Http
        };

        Self {
            kind,
            message,
            status: Some(status.as_u16()),
            code: parsed.and_then(|b| b.code()),
            is_network_error: false,
            is_retryable: is_retryable_status(status),
        }
    }

    pub fn session_expired() -> Self {
        Self {
            status: Some(StatusCode::UNAUTHORIZED.as_u16()),
            ..Self::local(
                ErrorKind::SessionExpired,
                ErrorCode::SessionExpired,
                ErrorCode::SessionExpired.message(),
            )
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::local(ErrorKind::Validation, ErrorCode::ValidationFailed, message)
    }

    /// Validation failure with a specific code (`OUT_OF_STOCK`, `CART_EMPTY` ...)
    pub fn validation_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::local(ErrorKind::Validation, code, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::local(ErrorKind::InvalidResponse, ErrorCode::InvalidResponse, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::local(ErrorKind::Storage, ErrorCode::StorageError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::local(ErrorKind::Config, ErrorCode::ConfigError, message)
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.and_then(|s| StatusCode::from_u16(s).ok())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized | ErrorKind::SessionExpired)
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    /// Whether the UI should offer a manual retry
    pub fn can_retry_manually(&self) -> bool {
        self.is_retryable || self.is_network_error
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_response(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_is_retryable() {
        let err = ClientError::from_response(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert_eq!(err.kind, ErrorKind::Http);
        assert_eq!(err.status, Some(503));
        assert!(err.is_retryable);
        assert!(!err.is_network_error);
    }

    #[test]
    fn test_bad_request_uses_server_message() {
        let body = br#"{"message": "Size is required", "code": "VALIDATION"}"#;
        let err = ClientError::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.message, "Size is required");
        assert_eq!(err.code.as_deref(), Some("VALIDATION"));
        assert!(!err.is_retryable);
    }

    #[test]
    fn test_unauthorized_kind() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, b"");
        assert!(err.is_unauthorized());
        assert_eq!(err.message, "Authentication required");
    }

    #[test]
    fn test_network_flags() {
        let err = ClientError::network("connection refused");
        assert!(err.is_network_error);
        assert!(err.is_retryable);
        assert!(err.status.is_none());

        let err = ClientError::timeout(Duration::from_secs(10));
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(err.is_retryable);
    }

    #[test]
    fn test_validation_never_retryable() {
        let err = ClientError::validation_code(ErrorCode::OutOfStock, "Only 2 left");
        assert!(err.is_validation());
        assert!(!err.can_retry_manually());
        assert_eq!(err.code.as_deref(), Some("OUT_OF_STOCK"));
    }
}
