// shop-client/tests/common/mod.rs
// Scripted transport and client builders shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::models::{AuthResponse, Role, User};
use shop_client::{
    ApiClient, ClientConfig, Connectivity, HttpRequest, HttpResponse, MemoryStorage, SessionStore,
    Transport, TransportError,
};

pub const BASE_URL: &str = "http://shop.test/api";

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Transport answering from a closure, recording every request
#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<Handler>,
    latency: Duration,
    log: Arc<Mutex<Vec<HttpRequest>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("latency", &self.latency)
            .finish()
    }
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            latency: Duration::ZERO,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Delay every response by `latency` (use with paused time)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Requests sent to `path` (relative to [`BASE_URL`], query ignored)
    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| path_of(r) == path).count()
    }

    pub fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.handler)(&request)
    }
}

/// Path of a request relative to [`BASE_URL`], without the query
pub fn path_of(request: &HttpRequest) -> &str {
    let rest = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url);
    rest.split('?').next().unwrap_or(rest)
}

pub fn ok(value: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::json(reqwest::StatusCode::OK, &value))
}

pub fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(
        reqwest::StatusCode::from_u16(code).unwrap(),
    ))
}

pub fn config() -> ClientConfig {
    ClientConfig::new(BASE_URL)
}

pub fn api_client(transport: &MockTransport) -> ApiClient {
    api_client_with(transport, Connectivity::default())
}

pub fn api_client_with(transport: &MockTransport, connectivity: Connectivity) -> ApiClient {
    let session = SessionStore::new(Arc::new(MemoryStorage::new()));
    ApiClient::new(config(), Arc::new(transport.clone()), session, connectivity)
}

pub fn customer() -> User {
    User {
        id: "u-1".into(),
        name: "Mai".into(),
        email: "mai@example.com".into(),
        role: Role::Customer,
        phone: None,
    }
}

pub fn auth_json(token: &str, refresh_token: &str) -> Value {
    json!({
        "token": token,
        "refreshToken": refresh_token,
        "user": { "id": "u-1", "name": "Mai", "email": "mai@example.com", "role": "CUSTOMER" }
    })
}

/// Store a session as if the user had logged in
pub async fn sign_in(session: &SessionStore, token: &str, refresh_token: &str) {
    session
        .start(&AuthResponse {
            token: token.into(),
            refresh_token: refresh_token.into(),
            user: customer(),
        })
        .await
        .unwrap();
}
