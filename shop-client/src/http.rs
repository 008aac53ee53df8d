//! HTTP transport seam
//!
//! The dispatch layer talks to the network through [`Transport`], one
//! request in, one response out. [`ReqwestTransport`] is the production
//! implementation; tests plug in scripted transports. Timeouts, retries
//! and auth are handled above this layer.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::error::{ClientError, ClientResult};

/// Transport-level failure (no HTTP status available)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Other(String),
}

/// File part of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Form field name, e.g. "image"
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Explicit MIME type; guessed from `file_name` when absent
    pub mime: Option<String>,
    /// Extra text fields sent alongside the file
    pub fields: Vec<(String, String)>,
}

impl FileUpload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
            mime: None,
            fields: Vec::new(),
        }
    }

    /// Read a file from disk
    pub async fn from_path(field: impl Into<String>, path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::validation(format!("invalid file name: {}", path.display())))?
            .to_string();
        Ok(Self::new(field, file_name, bytes))
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn content_type(&self) -> String {
        self.mime.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string()
        })
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Serialized JSON
    Json(Vec<u8>),
    Multipart(FileUpload),
}

/// Outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Bearer token currently attached, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Received response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut resp = Self::new(status);
        resp.body = value.to_string().into_bytes();
        resp.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        resp
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: &str) -> Self {
        if let Ok(v) = HeaderValue::from_str(value) {
            self.headers.insert(name, v);
        }
        self
    }

    /// `retry-after` in whole seconds (HTTP-date form is ignored)
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }
}

/// One HTTP round-trip
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// ReqwestTransport
// ============================================================================

/// Network transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (custom TLS, proxies ...)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        match request.body {
            Some(RequestBody::Json(bytes)) => {
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes);
            }
            Some(RequestBody::Multipart(upload)) => {
                let content_type = upload.content_type();
                let part = reqwest::multipart::Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&content_type)
                    .map_err(|e| TransportError::Other(e.to_string()))?;
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in upload.fields {
                    form = form.text(name, value);
                }
                builder = builder.multipart(form.part(upload.field, part));
            }
            None => {}
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
