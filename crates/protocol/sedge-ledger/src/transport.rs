//! Ledger transport seam.
//!
//! A transport submits a request body and later completes a
//! [`ResponseHandle`] from whatever task receives the answer. The caller
//! holds the other half of the rendezvous and decides how long to wait.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};

/// Completion half of a ledger request rendezvous.
#[derive(Debug)]
pub struct ResponseHandle {
    tx: oneshot::Sender<LedgerResult<Vec<u8>>>,
}

/// Waiting half of a ledger request rendezvous.
pub type ResponseReceiver = oneshot::Receiver<LedgerResult<Vec<u8>>>;

impl ResponseHandle {
    /// Create a connected handle and receiver.
    pub fn channel() -> (Self, ResponseReceiver) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Deliver a response body.
    ///
    /// A caller that already gave up is not an error.
    pub fn complete(self, body: Vec<u8>) {
        if self.tx.send(Ok(body)).is_err() {
            debug!("Ledger response arrived after the caller stopped waiting");
        }
    }

    /// Deliver a transport failure.
    pub fn fail(self, error: LedgerError) {
        if self.tx.send(Err(error)).is_err() {
            debug!("Ledger failure arrived after the caller stopped waiting");
        }
    }
}

/// Trait for delivering JSON-RPC bodies to a ledger node.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit `body` to `path`; the response is delivered through `on_response`.
    ///
    /// Returns an error only if the request could not be submitted.
    async fn post(&self, path: &str, body: Vec<u8>, on_response: ResponseHandle)
        -> LedgerResult<()>;
}

/// HTTP transport to a ledger node.
pub struct HttpLedgerTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLedgerTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.response_timeout + Duration::from_secs(1))
            .build()
            .map_err(|e| LedgerError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn send(client: reqwest::Client, url: String, body: Vec<u8>) -> LedgerResult<Vec<u8>> {
        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::timeout(format!("Ledger request timed out: {}", e))
                } else {
                    LedgerError::network(format!("Ledger request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body, "Ledger node rejected request");
            return Err(LedgerError::network(format!(
                "Ledger request failed with status {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LedgerError::network(format!("Failed to read ledger response: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl LedgerTransport for HttpLedgerTransport {
    async fn post(
        &self,
        path: &str,
        body: Vec<u8>,
        on_response: ResponseHandle,
    ) -> LedgerResult<()> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, len = body.len(), "Posting ledger request");

        let client = self.client.clone();
        tokio::spawn(async move {
            match Self::send(client, url, body).await {
                Ok(bytes) => on_response.complete(bytes),
                Err(e) => on_response.fail(e),
            }
        });
        Ok(())
    }
}

impl std::fmt::Debug for HttpLedgerTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLedgerTransport")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
