// ABOUTME: Transport seam for the outcomes exchange with a reqwest production implementation
// ABOUTME: One bounded POST per call; dropping the future cancels the underlying request

//! Outcome transport.
//!
//! [`OutcomeTransport`] is the seam between the outcomes client and the
//! network: one POST, one response, a caller-supplied timeout. Tests
//! substitute stubs; production uses [`HttpTransport`] on `reqwest` with
//! rustls. Cancellation propagates: dropping the returned future aborts
//! the in-flight request, so a hung consumer cannot leak a connection.

use crate::config::OutcomeConfig;
use crate::errors::OutcomeError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::timeout as bounded;

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded as text.
    pub body: String,
}

/// A single-attempt POST transport.
#[async_trait]
pub trait OutcomeTransport: Send + Sync {
    /// Issue one POST and return the consumer's response.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::Transport`] when no response was received
    /// (connection refused, timeout, TLS failure). Implementations must
    /// never report such a failure as success.
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, OutcomeError>;
}

/// Production transport over a pooled `reqwest` client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with the configured connection and request
    /// timeouts.
    #[must_use]
    pub fn new(config: &OutcomeConfig) -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&OutcomeConfig::default())
    }
}

#[async_trait]
impl OutcomeTransport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, OutcomeError> {
        let mut request = self.client.post(url).timeout(timeout).body(body.to_vec());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        // The caller-supplied timeout is authoritative; the client-level
        // timeout is a backstop for the body read below.
        let response = bounded(timeout, request.send())
            .await
            .map_err(|_| {
                OutcomeError::Transport(format!("no response within {}s", timeout.as_secs()))
            })?
            .map_err(|err| OutcomeError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| OutcomeError::Transport(err.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
