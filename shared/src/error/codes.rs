//! Client-side error codes
//!
//! Codes the client attaches to errors it produces itself. Server codes
//! travel as opaque strings and are never parsed into this enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Client error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ==================== Transport ====================
    /// Request never reached the server
    NetworkError,
    /// Request exceeded its timeout
    TimeoutError,
    /// Device is known offline, nothing was sent
    Offline,
    /// Caller abandoned the request
    Cancelled,

    // ==================== Auth ====================
    /// 401 that could not be recovered
    NotAuthenticated,
    /// Token refresh failed, session was cleared
    SessionExpired,

    // ==================== Validation ====================
    /// Client-side validation failed before any network call
    ValidationFailed,
    /// Requested quantity exceeds recorded stock
    OutOfStock,
    /// Checkout attempted with an empty cart
    CartEmpty,

    // ==================== Local ====================
    /// Response body could not be decoded
    InvalidResponse,
    /// Local storage read/write failed
    StorageError,
    /// Invalid configuration
    ConfigError,
}

impl ErrorCode {
    /// Wire string, e.g. `NETWORK_ERROR`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::Offline => "OFFLINE",
            Self::Cancelled => "CANCELLED",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::CartEmpty => "CART_EMPTY",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::StorageError => "STORAGE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Default user-facing message
    pub fn message(&self) -> &'static str {
        match self {
            Self::NetworkError => "Unable to reach the server",
            Self::TimeoutError => "The request timed out",
            Self::Offline => "No internet connection",
            Self::Cancelled => "Request cancelled",
            Self::NotAuthenticated => "Please sign in to continue",
            Self::SessionExpired => "Your session has expired, please sign in again",
            Self::ValidationFailed => "Please check the highlighted fields",
            Self::OutOfStock => "Not enough stock for this item",
            Self::CartEmpty => "Your cart is empty",
            Self::InvalidResponse => "Unexpected response from the server",
            Self::StorageError => "Could not access local storage",
            Self::ConfigError => "Invalid client configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
