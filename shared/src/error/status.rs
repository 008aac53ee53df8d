//! HTTP status classification

use http::StatusCode;

/// Whether a failed response may succeed if sent again unchanged.
///
/// 5xx, 429 and 408 are retryable; every other status is not.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

/// Fallback message when the server sent no usable body
pub fn default_status_message(status: StatusCode) -> String {
    match status {
        StatusCode::BAD_REQUEST => "Invalid request".to_string(),
        StatusCode::UNAUTHORIZED => "Authentication required".to_string(),
        StatusCode::FORBIDDEN => "Permission denied".to_string(),
        StatusCode::NOT_FOUND => "Resource not found".to_string(),
        StatusCode::CONFLICT => "Resource already exists".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests, please slow down".to_string(),
        s if s.is_server_error() => "Server error, please try again later".to_string(),
        s => format!("Request failed with status {}", s.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for code in [500, 502, 503, 504, 429, 408] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(is_retryable_status(status), "{code} should be retryable");
        }
    }

    #[test]
    fn test_non_retryable_statuses() {
        for code in [400, 401, 403, 404, 409, 422] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!is_retryable_status(status), "{code} should not be retryable");
        }
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(default_status_message(StatusCode::NOT_FOUND), "Resource not found");
        assert_eq!(
            default_status_message(StatusCode::IM_A_TEAPOT),
            "Request failed with status 418"
        );
    }
}
