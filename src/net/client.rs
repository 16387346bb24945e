//! Shared API client: request/response interceptors around a `Transport`.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is classified once, surfaced once through the `Notifier`,
//! and then returned to the caller. The client never retries and never
//! touches session state; a 401 comes back as `ApiError::Unauthorized` for
//! the session layer to act on.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::error::{ApiError, classify_failure};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::notify::{Notice, Notifier, TracingNotifier};

pub struct ApiClient<T = HttpTransport> {
    transport: T,
    notifier: Arc<dyn Notifier>,
}

impl<T: Transport> ApiClient<T> {
    /// Client that reports failures as log events.
    pub fn new(transport: T) -> Self {
        Self::with_notifier(transport, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(transport: T, notifier: Arc<dyn Notifier>) -> Self {
        Self { transport, notifier }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and return the raw response on success.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for transport failures and
    /// non-success statuses. The error has already been notified.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = intercept_request(request);
        let method = request.method.clone();
        let path = request.path.clone();

        let result = match self.transport.send(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(classify_failure(response.status, &response.body)),
            Err(error) => Err(error),
        };

        result.map_err(|error| {
            tracing::warn!(%method, %path, status = ?error.status(), %error, "api request failed");
            self.reject(error)
        })
    }

    /// Send a request and decode the JSON payload.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::execute`], plus [`ApiError::Decode`] when a success
    /// body does not match `R`.
    pub async fn json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        serde_json::from_slice(&response.body).map_err(|e| self.reject(ApiError::Decode(e.to_string())))
    }

    pub(crate) fn reject(&self, error: ApiError) -> ApiError {
        self.notifier.notify(&Notice::error(error.to_string()));
        error
    }
}

/// Outgoing hook applied to every request. Credentials ride on the cookie
/// jar, so this only records the call.
fn intercept_request(request: ApiRequest) -> ApiRequest {
    tracing::debug!(method = %request.method, path = %request.path, "api request");
    request
}
