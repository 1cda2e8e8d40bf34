//! Network transport backed by `reqwest`.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{BoxFuture, HttpTransport, TransportRequest, TransportResponse};

/// [`HttpTransport`] that performs real HTTP calls.
///
/// The underlying client pools connections, so one instance should be shared
/// across executions.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a connect timeout.
    ///
    /// The overall request timeout is enforced by the executor, not here.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| TransportError::other(format!("failed to create client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn forward(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        debug!(
            http.status_code = status.as_u16(),
            body_bytes = body.len(),
            "received response"
        );

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::connect(error.to_string())
    } else {
        TransportError::other(error.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        Box::pin(self.forward(request))
    }
}
