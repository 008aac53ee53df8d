//! Request dispatch
//!
//! [`ApiClient`] is the single entry point for calls to the shop backend.
//! Each request goes through the same lifecycle:
//!
//! 1. connectivity preflight (fail fast when offline)
//! 2. dedup: join an identical in-flight request
//! 3. bearer token attach
//! 4. send with exponential backoff on retryable failures
//! 5. on 401, single-flight token refresh and one replay
//! 6. on 429 with `retry-after`, wait and replay once
//! 7. settle, releasing the dedup entry
//!
//! Every call can be tuned with [`RequestOptions`].

mod dedup;
mod refresh;
mod retry;

pub use dedup::dedup_key;

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{AuthTokens, RefreshRequest};
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, RetryPolicy};
use crate::connectivity::Connectivity;
use crate::error::{ClientError, ClientResult};
use crate::http::{FileUpload, HttpRequest, HttpResponse, RequestBody, Transport, TransportError};
use crate::session::{LogoutReason, SessionStore};

use dedup::{CallFuture, InflightRegistry};
use refresh::RefreshCoordinator;
use retry::with_backoff;

/// Refresh endpoint, called directly on the transport
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";

// ============================================================================
// Request options
// ============================================================================

/// Per-request overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the configured request/upload timeout
    pub timeout: Option<Duration>,
    /// Overrides the configured number of attempts
    pub max_retries: Option<u32>,
    /// Send without a bearer token; a 401 is returned as is
    pub skip_auth: bool,
    /// Single attempt
    pub skip_retry: bool,
    /// Always issue a new call
    pub skip_dedup: bool,
    /// Query string parameters, appended in order
    pub params: Vec<(String, String)>,
    /// Abandons the wait when cancelled
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn skip_retry(mut self) -> Self {
        self.skip_retry = true;
        self
    }

    pub fn skip_dedup(mut self) -> Self {
        self.skip_dedup = true;
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Fully resolved request, owned by the dispatch future
#[derive(Debug, Clone)]
struct Call {
    method: Method,
    url: String,
    body: Option<RequestBody>,
    timeout: Duration,
    skip_auth: bool,
    retry: RetryPolicy,
}

impl Call {
    fn label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

// ============================================================================
// ApiClient
// ============================================================================

struct Inner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    connectivity: Connectivity,
    inflight: InflightRegistry,
    refresh: RefreshCoordinator,
}

/// HTTP client for the shop backend
///
/// Cheap to clone; clones share the dedup registry and the refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("inflight", &self.inner.inflight)
            .field("refresh", &self.inner.refresh)
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: SessionStore,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                session,
                connectivity,
                inflight: InflightRegistry::default(),
                refresh: RefreshCoordinator::default(),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.inner.connectivity
    }

    /// Number of distinct requests currently in flight
    pub fn inflight_count(&self) -> usize {
        self.inner.inflight.len()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    // ========== Typed verbs ==========

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        self.get_with(endpoint, RequestOptions::default()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let value = self.execute(Method::GET, endpoint, None, options).await?;
        decode(value)
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with(endpoint, body, RequestOptions::default()).await
    }

    pub async fn post_with<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        let value = self
            .execute(Method::POST, endpoint, Some(body), options)
            .await?;
        decode(value)
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put_with(endpoint, body, RequestOptions::default()).await
    }

    pub async fn put_with<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        let value = self
            .execute(Method::PUT, endpoint, Some(body), options)
            .await?;
        decode(value)
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        self.delete_with(endpoint, RequestOptions::default()).await
    }

    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let value = self.execute(Method::DELETE, endpoint, None, options).await?;
        decode(value)
    }

    /// Multipart upload; uses the upload timeout unless overridden
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        upload: FileUpload,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let value = self
            .execute(
                Method::POST,
                endpoint,
                Some(RequestBody::Multipart(upload)),
                options,
            )
            .await?;
        decode(value)
    }

    // ========== Lifecycle ==========

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> ClientResult<Value> {
        if !self.inner.connectivity.is_online() {
            tracing::warn!(%method, endpoint, "Offline, request not sent");
            return Err(ClientError::offline());
        }

        let url = self.inner.build_url(endpoint, &options.params)?;
        let default_timeout = match body {
            Some(RequestBody::Multipart(_)) => self.inner.config.upload_timeout,
            _ => self.inner.config.request_timeout,
        };
        let mut retry = self.inner.config.retry;
        if let Some(max_retries) = options.max_retries {
            retry.max_retries = max_retries;
        }
        if options.skip_retry {
            retry.max_retries = 1;
        }
        let call = Call {
            method,
            url,
            body,
            timeout: options.timeout.unwrap_or(default_timeout),
            skip_auth: options.skip_auth,
            retry,
        };

        let pending: CallFuture = if options.skip_dedup {
            Arc::clone(&self.inner).run(call).boxed()
        } else {
            let key = dedup_key(&call.method, &call.url, call.body.as_ref());
            let inner = Arc::clone(&self.inner);
            let (shared, joined) = self
                .inner
                .inflight
                .join_or_start(key.clone(), move || inner.run(call).boxed());
            if joined {
                tracing::debug!(key = %key, "Joined in-flight request");
            }
            shared.boxed()
        };

        match options.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(endpoint, "Request cancelled by caller");
                    Err(ClientError::cancelled())
                }
                result = pending => result,
            },
            None => pending.await,
        }
    }
}

impl Inner {
    fn build_url(&self, endpoint: &str, params: &[(String, String)]) -> ClientResult<String> {
        let mut url = Url::parse(&self.config.url_for(endpoint))
            .map_err(|e| ClientError::config(format!("Invalid URL for '{endpoint}': {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url.into())
    }

    /// Retry loop around one logical attempt
    async fn run(self: Arc<Self>, call: Call) -> ClientResult<Value> {
        let label = call.label();
        with_backoff(&call.retry, &label, |attempt| {
            let inner = Arc::clone(&self);
            let call = &call;
            async move {
                tracing::debug!(attempt = attempt + 1, method = %call.method, url = %call.url, "Sending request");
                inner.attempt(call).await
            }
        })
        .await
    }

    /// One attempt: send, then the 401 and 429 replays
    async fn attempt(self: &Arc<Self>, call: &Call) -> ClientResult<Value> {
        let mut request = HttpRequest::new(call.method.clone(), call.url.clone());
        request.body = call.body.clone();
        if !call.skip_auth
            && let Some(token) = self.session.token().await?
        {
            attach_bearer(&mut request, &token)?;
        }

        let mut response = self.send(request.clone(), call.timeout).await?;

        // anonymous 401s have nothing to refresh
        if response.status == StatusCode::UNAUTHORIZED
            && !call.skip_auth
            && request.bearer_token().is_some()
        {
            let token = self.renew_token(request.bearer_token()).await?;
            attach_bearer(&mut request, &token)?;
            tracing::debug!(url = %call.url, "Replaying request with refreshed token");
            response = self.send(request.clone(), call.timeout).await?;
        }

        if response.status == StatusCode::TOO_MANY_REQUESTS
            && let Some(wait) = response.retry_after()
        {
            tracing::warn!(
                url = %call.url,
                wait_secs = wait.as_secs(),
                "Rate limited, waiting before replay"
            );
            tokio::time::sleep(wait).await;
            response = self.send(request, call.timeout).await?;
        }

        into_value(response)
    }

    async fn send(&self, request: HttpRequest, timeout: Duration) -> ClientResult<HttpResponse> {
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(TransportError::Timeout)) | Err(_) => Err(ClientError::timeout(timeout)),
            Ok(Err(e)) => Err(ClientError::network(e.to_string())),
        }
    }

    /// Token to replay with after a 401 on a request sent with `sent_with`
    async fn renew_token(self: &Arc<Self>, sent_with: Option<&str>) -> ClientResult<String> {
        // another request already refreshed since this one was sent
        if let Some(current) = self.session.token().await?
            && sent_with != Some(current.as_str())
        {
            return Ok(current);
        }

        let inner = Arc::clone(self);
        self.refresh
            .refresh(move || async move { inner.exchange_refresh_token().await })
            .await
    }

    /// `POST /auth/refresh`; on failure the session is cleared
    async fn exchange_refresh_token(&self) -> ClientResult<String> {
        tracing::info!("Access token rejected, refreshing");
        match self.request_new_tokens().await {
            Ok(tokens) => {
                self.session.update_tokens(&tokens).await?;
                Ok(tokens.token)
            }
            Err(e) => {
                tracing::warn!(status = ?e.status, "Token refresh failed, logging out: {e}");
                if let Err(clear_err) = self.session.clear(LogoutReason::SessionExpired).await {
                    tracing::warn!("Failed to clear session: {clear_err}");
                }
                Err(ClientError::session_expired())
            }
        }
    }

    async fn request_new_tokens(&self) -> ClientResult<AuthTokens> {
        let refresh_token = self
            .session
            .refresh_token()
            .await?
            .ok_or_else(ClientError::session_expired)?;

        let mut request = HttpRequest::new(Method::POST, self.config.url_for(REFRESH_ENDPOINT));
        request.body = Some(json_body(&RefreshRequest { refresh_token })?);

        let response = self.send(request, self.config.request_timeout).await?;
        if !response.status.is_success() {
            return Err(ClientError::from_response(response.status, &response.body));
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| ClientError::invalid_response(format!("Invalid refresh response: {e}")))
    }
}

fn attach_bearer(request: &mut HttpRequest, token: &str) -> ClientResult<()> {
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::storage("stored token is not a valid header value"))?;
    request.headers.insert(AUTHORIZATION, value);
    Ok(())
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> ClientResult<RequestBody> {
    serde_json::to_vec(body)
        .map(RequestBody::Json)
        .map_err(|e| ClientError::validation(format!("Failed to encode request body: {e}")))
}

/// Success body as JSON (`Null` when empty), or the normalized error
fn into_value(response: HttpResponse) -> ClientResult<Value> {
    if !response.status.is_success() {
        return Err(ClientError::from_response(response.status, &response.body));
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| ClientError::invalid_response(format!("Invalid response body: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::invalid_response(format!("Unexpected response shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let token = CancellationToken::new();
        let options = RequestOptions::new()
            .timeout(Duration::from_secs(2))
            .max_retries(5)
            .skip_auth()
            .skip_dedup()
            .param("page", 2)
            .cancel_with(token);
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
        assert_eq!(options.max_retries, Some(5));
        assert!(options.skip_auth && options.skip_dedup && !options.skip_retry);
        assert_eq!(options.params, vec![("page".to_string(), "2".to_string())]);
        assert!(options.cancel.is_some());
    }

    #[test]
    fn test_empty_body_is_null() {
        let response = HttpResponse::new(StatusCode::NO_CONTENT);
        assert_eq!(into_value(response).unwrap(), Value::Null);
    }

    #[test]
    fn test_error_status_is_normalized() {
        let response = HttpResponse::json(
            StatusCode::CONFLICT,
            &serde_json::json!({"message": "Email already registered"}),
        );
        let err = into_value(response).unwrap_err();
        assert_eq!(err.status, Some(409));
        assert_eq!(err.message, "Email already registered");
    }

    #[test]
    fn test_build_url_appends_params() {
        let inner = Inner {
            config: ClientConfig::new("http://localhost:8080/api"),
            transport: Arc::new(crate::http::ReqwestTransport::with_client(reqwest::Client::new())),
            session: SessionStore::new(Arc::new(crate::storage::MemoryStorage::new())),
            connectivity: Connectivity::default(),
            inflight: InflightRegistry::default(),
            refresh: RefreshCoordinator::default(),
        };
        let url = inner
            .build_url("/products/search", &[("q".into(), "áo thun".into()), ("page".into(), "1".into())])
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/api/products/search?q=%C3%A1o+thun&page=1"
        );
    }
}
