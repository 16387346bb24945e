//! Networking for the address book REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves bytes, `client` applies the shared interceptors,
//! `api` names every endpoint, and `types` defines the wire schema.

pub mod api;
pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport};
