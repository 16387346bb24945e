//! In-process transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Transport};

/// Records every request and answers from a queue of canned results.
/// An empty queue answers `200 {}`.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, result: Result<ApiResponse, ApiError>) {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).push_back(result);
    }

    pub(crate) fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(Ok(json_response(status, &body)));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }
}

pub(crate) fn json_response(status: u16, body: &serde_json::Value) -> ApiResponse {
    ApiResponse {
        status,
        content_type: Some("application/json".to_owned()),
        content_disposition: None,
        body: serde_json::to_vec(body).expect("serialize test body"),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(json_response(200, &serde_json::json!({}))))
    }
}
