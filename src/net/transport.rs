//! Request/response carriers and the HTTP transport behind `ApiClient`.
//!
//! ARCHITECTURE
//! ============
//! `Transport` is the only seam that touches the network. It returns every
//! response it receives, success or not; classification happens one layer up
//! in the interceptor so all transports share the same error table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::error::ApiError;
use super::types::ImportFile;
use crate::config::{ClientConfig, ConfigError};

/// Body attached to an outgoing request.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// A single file part, sent as `multipart/form-data`.
    Multipart { field: String, file: ImportFile },
}

/// An outgoing API call, relative to the configured base path.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be represented as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn with_file(mut self, field: impl Into<String>, file: ImportFile) -> Self {
        self.body = RequestBody::Multipart { field: field.into(), file };
        self
    }
}

/// A received response, fully buffered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns whatever response comes back.
///
/// Implementations must not retry. Only [`ApiError::Transport`] and
/// [`ApiError::Timeout`] may be returned as errors; any response that was
/// received is returned as `Ok` regardless of status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

/// `reqwest` transport with a fixed base path, fixed timeout, and a cookie
/// jar shared by every request so the server session travels automatically.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    cookie_url: reqwest::Url,
    jar: Arc<Jar>,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the base URL does not parse or the
    /// underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let cookie_url = reqwest::Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), cookie_url, jar, timeout: config.timeout })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current `Cookie` header value the jar would send to the API.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.cookie_url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Seed the jar from a previously saved `Cookie` header value.
    pub fn restore_session_cookie(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|pair| pair.contains('=')) {
            self.jar.add_cookie_str(pair, &self.cookie_url);
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_send_error(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout { timeout_ms: self.timeout.as_millis() }
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self.http.request(request.method, self.url_for(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart { field, file } => {
                let part = Part::bytes(file.bytes).file_name(file.filename);
                builder.multipart(Form::new().part(field, part))
            }
        };

        let response = builder.send().await.map_err(|e| self.map_send_error(&e))?;
        let status = response.status().as_u16();
        let content_type = header_string(response.headers(), CONTENT_TYPE);
        let content_disposition = header_string(response.headers(), CONTENT_DISPOSITION);
        let body = response.bytes().await.map_err(|e| self.map_send_error(&e))?.to_vec();

        Ok(ApiResponse { status, content_type, content_disposition, body })
    }
}
