//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | SHOP_API_URL | http://localhost:8080/api | Backend base URL |
//! | SHOP_REQUEST_TIMEOUT_MS | 10000 | Per-request timeout |
//! | SHOP_UPLOAD_TIMEOUT_MS | 30000 | Upload timeout |
//! | SHOP_MAX_RETRIES | 3 | Attempts per request, first one included |
//! | SHOP_RETRY_BASE_DELAY_MS | 1000 | First backoff delay |
//! | SHOP_RETRY_MAX_DELAY_MS | 10000 | Backoff cap |
//! | SHOP_DATA_DIR | ./.shop-data | Session and cart storage |

use std::path::PathBuf;
use std::time::Duration;

/// Exponential backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts in total, first attempt included
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Policy that performs a single attempt
    pub fn none() -> Self {
        Self {
            max_retries: 1,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay after the failed attempt `attempt` (0-based):
    /// `min(base_delay * backoff_factor^attempt, max_delay)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_factor
            .checked_pow(attempt)
            .and_then(|m| self.base_delay.checked_mul(m))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Client configuration for the shop backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://shop.example.com/api")
    pub base_url: String,

    /// Default per-request timeout
    pub request_timeout: Duration,

    /// Timeout for multipart uploads
    pub upload_timeout: Duration,

    /// Default retry policy
    pub retry: RetryPolicy,

    /// Directory for session and cart storage
    pub data_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_millis(10_000),
            upload_timeout: Duration::from_millis(30_000),
            retry: RetryPolicy::default(),
            data_dir: PathBuf::from("./.shop-data"),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        fn env_u64(name: &str) -> Option<u64> {
            std::env::var(name).ok().and_then(|v| v.parse().ok())
        }

        let mut config = Self::new(
            std::env::var("SHOP_API_URL").unwrap_or_else(|_| "http://localhost:8080/api".into()),
        );
        if let Some(ms) = env_u64("SHOP_REQUEST_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("SHOP_UPLOAD_TIMEOUT_MS") {
            config.upload_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = env_u64("SHOP_MAX_RETRIES").and_then(|n| u32::try_from(n).ok()) {
            config.retry.max_retries = n;
        }
        if let Some(ms) = env_u64("SHOP_RETRY_BASE_DELAY_MS") {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("SHOP_RETRY_MAX_DELAY_MS") {
            config.retry.max_delay = Duration::from_millis(ms);
        }
        if let Ok(dir) = std::env::var("SHOP_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Absolute URL for an endpoint such as `/products/42`
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api")
    }
}
