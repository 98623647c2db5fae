//! Transport abstraction for Cookie Cloud.
//!
//! This module provides a pluggable transport layer for the store's single
//! `/get` round trip (HTTP via reqwest, mock for testing).
//!
//! # Design
//!
//! The transport trait is async and request/response shaped:
//! - `get()` posts one batched [`GetRequest`] to `{endpoint}/get` and
//!   returns the decoded [`GetResponse`]
//!
//! Application-level failures (`code != 0`) are not transport errors; they
//! come back inside the response for the client to interpret.
//!
//! # Example
//!
//! ```ignore
//! let transport = HttpTransport::new()?;
//! let response = transport.get("https://store.example", &request).await?;
//! ```

mod http;
mod mock;

pub use http::{HttpTransport, DEFAULT_TIMEOUT};
pub use mock::{MockTransport, RecordedRequest};

use async_trait::async_trait;
use cookie_types::{GetRequest, GetResponse};
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The store answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The response body was not a valid store response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Transport trait for the store's lookup endpoint.
///
/// Implementations handle the underlying connection mechanism
/// (HTTP, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post `request` to `{endpoint}/get`.
    ///
    /// A trailing `/` on `endpoint` is ignored.
    async fn get(
        &self,
        endpoint: &str,
        request: &GetRequest,
    ) -> Result<GetResponse, TransportError>;
}

/// The lookup URL for an endpoint.
pub fn get_url(endpoint: &str) -> String {
    format!("{}/get", endpoint.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_url_trims_trailing_slashes() {
        assert_eq!(get_url("https://store.example"), "https://store.example/get");
        assert_eq!(get_url("https://store.example/"), "https://store.example/get");
        assert_eq!(get_url("https://store.example/api//"), "https://store.example/api/get");
    }

    #[test]
    fn error_display() {
        assert_eq!(TransportError::Status(502).to_string(), "unexpected HTTP status 502");
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
    }
}
