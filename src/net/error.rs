//! Response-error classification shared by every API call.
//!
//! ERROR HANDLING
//! ==============
//! A structured `{"error": "..."}` body wins over the status table; the
//! status code still decides the variant so a 401 is always recognizable as
//! an authentication failure by the session layer. A 401 carrying a
//! server message still ends the session; the message only feeds the notice.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized, please log in again";
pub const FORBIDDEN_MESSAGE: &str = "access denied";
pub const NOT_FOUND_MESSAGE: &str = "request error, resource not found";
pub const SERVER_ERROR_MESSAGE: &str = "server error";

/// Errors produced by API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response was received.
    #[error("{0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("timeout of {timeout_ms}ms exceeded")]
    Timeout { timeout_ms: u128 },

    /// HTTP 401. The session is no longer valid.
    #[error("{message}")]
    Unauthorized { message: String },

    /// HTTP 403.
    #[error("{message}")]
    Forbidden { message: String },

    /// HTTP 404.
    #[error("{message}")]
    NotFound { message: String },

    /// HTTP 500.
    #[error("{message}")]
    Server { message: String },

    /// Any other non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A request payload could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// HTTP status carried by this error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Server { .. } => Some(500),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Timeout { .. } | Self::Decode(_) | Self::Encode(_) => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Server-supplied error message from a failure body, if one is present.
#[must_use]
pub fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.is_empty())
}

/// Fixed human-readable message for a status code.
#[must_use]
pub fn status_message(status: u16) -> String {
    match status {
        401 => UNAUTHORIZED_MESSAGE.to_owned(),
        403 => FORBIDDEN_MESSAGE.to_owned(),
        404 => NOT_FOUND_MESSAGE.to_owned(),
        500 => SERVER_ERROR_MESSAGE.to_owned(),
        other => format!("connection error {other}"),
    }
}

/// Classify a non-success response.
#[must_use]
pub fn classify_failure(status: u16, body: &[u8]) -> ApiError {
    let message = server_message(body).unwrap_or_else(|| status_message(status));
    match status {
        401 => ApiError::Unauthorized { message },
        403 => ApiError::Forbidden { message },
        404 => ApiError::NotFound { message },
        500 => ApiError::Server { message },
        status => ApiError::Status { status, message },
    }
}
