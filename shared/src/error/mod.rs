//! Error vocabulary shared by the client crate
//!
//! - [`ErrorCode`]: codes the client attaches to errors it raises itself
//! - [`ErrorBody`]: the backend's JSON error body
//! - [`is_retryable_status`]: HTTP status retry classification

mod codes;
mod status;

pub use codes::ErrorCode;
pub use status::{default_status_message, is_retryable_status};

use serde::{Deserialize, Serialize};

/// Error body returned by the backend.
///
/// Services are not consistent: some send `message`, some `error`, and
/// `code` may be a string or a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Parse a raw body, `None` when it is not a JSON object
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Self>(bytes).ok()
    }

    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }

    /// Server error code rendered as a string
    pub fn code(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_fallback() {
        let body = ErrorBody::parse(br#"{"error": "Email already used", "code": 4091}"#).unwrap();
        assert_eq!(body.message(), Some("Email already used"));
        assert_eq!(body.code().as_deref(), Some("4091"));
    }

    #[test]
    fn test_error_body_string_code() {
        let body = ErrorBody::parse(br#"{"message": "Out of stock", "code": "OUT_OF_STOCK"}"#)
            .unwrap();
        assert_eq!(body.message(), Some("Out of stock"));
        assert_eq!(body.code().as_deref(), Some("OUT_OF_STOCK"));
    }

    #[test]
    fn test_error_body_rejects_non_json() {
        assert!(ErrorBody::parse(b"<html>Bad Gateway</html>").is_none());
    }
}
