//! Exponential backoff
//!
//! The one retry loop of the client. Only errors flagged `is_retryable`
//! are attempted again.

use std::future::Future;

use crate::config::RetryPolicy;
use crate::error::ClientResult;

/// Run `op` until it succeeds, fails permanently, or attempts run out.
///
/// `op` receives the 0-based attempt number. After failed attempt `n` the
/// loop sleeps `policy.delay_for(n)`.
pub(crate) async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> ClientResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let attempts = policy.max_retries.max(1);
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "{label} succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable && attempt + 1 < attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    status = ?e.status,
                    "{label} failed, retrying: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable {
                    tracing::warn!(attempts, "{label} failed after all attempts: {e}");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_retryable_failure_uses_backoff_delays() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: ClientResult<()> = with_backoff(&RetryPolicy::default(), "GET /x", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::from_response(StatusCode::SERVICE_UNAVAILABLE, b"")) }
        })
        .await;

        assert_eq!(result.unwrap_err().status, Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1000 ms + 2000 ms
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: ClientResult<()> = with_backoff(&RetryPolicy::default(), "POST /x", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::from_response(StatusCode::BAD_REQUEST, b"")) }
        })
        .await;

        assert_eq!(result.unwrap_err().status, Some(400));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_later_attempt() {
        let result = with_backoff(&RetryPolicy::default(), "GET /x", |attempt| async move {
            if attempt < 2 {
                Err(ClientError::network("connection reset"))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result, Ok(2));
    }
}
