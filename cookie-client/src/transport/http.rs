//! HTTP transport: JSON over `POST {endpoint}/get`.

use super::{get_url, Transport, TransportError};
use async_trait::async_trait;
use cookie_types::{GetRequest, GetResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Connect and read timeout for store requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default 5 second timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        endpoint: &str,
        request: &GetRequest,
    ) -> Result<GetResponse, TransportError> {
        let url = get_url(endpoint);
        let body = request
            .to_json()
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        debug!("POST {} ({} ids)", url, request.id.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response.json::<GetResponse>().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::InvalidResponse(e.to_string())
            }
        })
    }
}
