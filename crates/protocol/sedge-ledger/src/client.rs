//! Ledger client.
//!
//! [`LedgerClient::call`] looks synchronous to its caller: it encodes the
//! call, hands it to the transport together with a [`ResponseHandle`], and
//! waits on the other half of that rendezvous for at most the configured
//! response timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use sedge_types::{AccountAddress, ConfirmationStatus, LedgerCallKind, TxHash};
use sedge_wire::{ConsumerKey, LedgerCallResult, LedgerCodec, WireError};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::retry::RetryPolicy;
use crate::transport::{LedgerTransport, ResponseHandle};

/// Issues typed ledger calls over a [`LedgerTransport`].
pub struct LedgerClient {
    transport: Arc<dyn LedgerTransport>,
    codec: LedgerCodec,
    post_path: String,
    response_timeout: Duration,
    request_retry: RetryPolicy,
    confirmation: RetryPolicy,
}

impl LedgerClient {
    /// Create a client from configuration.
    pub fn new(transport: Arc<dyn LedgerTransport>, config: &LedgerConfig) -> Self {
        Self {
            transport,
            codec: LedgerCodec::new(&config.gas, &config.key_deposit)
                .with_capacity(config.request_capacity),
            post_path: config.post_path.clone(),
            response_timeout: config.response_timeout,
            request_retry: RetryPolicy::from_config(&config.request_retry),
            confirmation: RetryPolicy::from_config(&config.confirmation),
        }
    }

    /// Issue a ledger call and wait for its result.
    ///
    /// Fails with [`LedgerError::Timeout`] if no response arrives within the
    /// response timeout, and with a wire error if the response id names a
    /// different call.
    ///
    /// Only reads and receipt polls are retried. A transaction that timed out
    /// may still have been mined, so it is submitted exactly once.
    pub async fn call(
        &self,
        kind: LedgerCallKind,
        sender: &str,
        receiver: &str,
        payload: Option<&[u8]>,
    ) -> LedgerResult<LedgerCallResult> {
        let body = self.codec.encode_call(kind, sender, receiver, payload)?;
        if kind.is_read() || kind == LedgerCallKind::GetTransactionReceipt {
            self.request_retry
                .execute(move || self.call_once(kind, body.clone()))
                .await
        } else {
            self.call_once(kind, body).await
        }
    }

    async fn call_once(&self, kind: LedgerCallKind, body: Vec<u8>) -> LedgerResult<LedgerCallResult> {
        debug!(%kind, len = body.len(), "Submitting ledger call");

        let (handle, rx) = ResponseHandle::channel();
        self.transport.post(&self.post_path, body, handle).await?;

        let bytes = match timeout(self.response_timeout, rx).await {
            Err(_) => {
                warn!(%kind, timeout = ?self.response_timeout, "Ledger response timed out");
                return Err(LedgerError::timeout(format!(
                    "no response to {} within {:?}",
                    kind, self.response_timeout
                )));
            }
            Ok(Err(_)) => {
                return Err(LedgerError::network(format!(
                    "transport dropped the response to {}",
                    kind
                )))
            }
            Ok(Ok(result)) => result?,
        };

        let response = self.codec.decode_response(&bytes)?;
        if response.kind != kind {
            return Err(WireError::malformed(format!(
                "response id names {}, expected {}",
                response.kind, kind
            ))
            .into());
        }
        Ok(response.result)
    }

    // =========================================================================
    // Typed calls
    // =========================================================================

    /// Commit a data hash. Returns the transaction hash.
    pub async fn write_data_hash(
        &self,
        producer: &AccountAddress,
        contract: &AccountAddress,
        hash: &[u8],
    ) -> LedgerResult<TxHash> {
        let result = self
            .call(
                LedgerCallKind::WriteDataHash,
                producer.as_str(),
                contract.as_str(),
                Some(hash),
            )
            .await?;
        expect_tx_hash(LedgerCallKind::WriteDataHash, result)
    }

    /// Read the committed data hash.
    pub async fn read_data_hash(
        &self,
        consumer: &AccountAddress,
        contract: &AccountAddress,
    ) -> LedgerResult<Vec<u8>> {
        match self
            .call(
                LedgerCallKind::ReadDataHash,
                consumer.as_str(),
                contract.as_str(),
                None,
            )
            .await?
        {
            LedgerCallResult::Data(bytes) => Ok(bytes),
            other => Err(unexpected(LedgerCallKind::ReadDataHash, &other)),
        }
    }

    /// Register the consumer's public key. Returns the transaction hash.
    pub async fn write_public_key(
        &self,
        consumer: &AccountAddress,
        contract: &AccountAddress,
        public_key_pem: &str,
    ) -> LedgerResult<TxHash> {
        let result = self
            .call(
                LedgerCallKind::WritePublicKey,
                consumer.as_str(),
                contract.as_str(),
                Some(public_key_pem.as_bytes()),
            )
            .await?;
        expect_tx_hash(LedgerCallKind::WritePublicKey, result)
    }

    /// Read the registered consumer address and public key.
    pub async fn read_public_key(
        &self,
        producer: &AccountAddress,
        contract: &AccountAddress,
    ) -> LedgerResult<ConsumerKey> {
        match self
            .call(
                LedgerCallKind::ReadPublicKey,
                producer.as_str(),
                contract.as_str(),
                None,
            )
            .await?
        {
            LedgerCallResult::ConsumerKey(key) => Ok(key),
            other => Err(unexpected(LedgerCallKind::ReadPublicKey, &other)),
        }
    }

    /// Vote on the producer. Returns the transaction hash.
    pub async fn rate_producer(
        &self,
        consumer: &AccountAddress,
        contract: &AccountAddress,
        positive: bool,
    ) -> LedgerResult<TxHash> {
        let kind = LedgerCallKind::vote(positive);
        let result = self
            .call(kind, consumer.as_str(), contract.as_str(), None)
            .await?;
        expect_tx_hash(kind, result)
    }

    /// Poll a transaction receipt once.
    pub async fn transaction_receipt(&self, tx: &TxHash) -> LedgerResult<ConfirmationStatus> {
        match self
            .call(
                LedgerCallKind::GetTransactionReceipt,
                "",
                "",
                Some(tx.as_str().as_bytes()),
            )
            .await?
        {
            LedgerCallResult::Confirmation(status) => Ok(status),
            other => Err(unexpected(LedgerCallKind::GetTransactionReceipt, &other)),
        }
    }

    // =========================================================================
    // Confirmation
    // =========================================================================

    /// Poll until `tx` is mined successfully.
    ///
    /// Polls at the confirmation interval up to the attempt bound. A
    /// reverted receipt or a failed poll ends polling immediately.
    pub async fn await_confirmation(&self, tx: &TxHash) -> LedgerResult<()> {
        let confirmed = self
            .confirmation
            .poll(move || async move {
                match self.transaction_receipt(tx).await? {
                    ConfirmationStatus::SucceededOk => Ok(Some(())),
                    ConfirmationStatus::SucceededFail => {
                        Err(LedgerError::TransactionReverted(tx.clone()))
                    }
                    ConfirmationStatus::Pending => {
                        debug!(%tx, "Transaction pending");
                        Ok(None)
                    }
                }
            })
            .await?;

        match confirmed {
            Some(()) => {
                info!(%tx, "Transaction confirmed");
                Ok(())
            }
            None => Err(LedgerError::ConfirmationExhausted {
                tx: tx.clone(),
                attempts: self.confirmation.max_attempts(),
            }),
        }
    }

    /// Whether `tx` was confirmed within the polling bound.
    ///
    /// `false` means abandon the attempt; the reason is logged.
    pub async fn wait_for_confirmation(&self, tx: &TxHash) -> bool {
        match self.await_confirmation(tx).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%tx, error = %e, "Transaction not confirmed");
                false
            }
        }
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("post_path", &self.post_path)
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}

fn expect_tx_hash(kind: LedgerCallKind, result: LedgerCallResult) -> LedgerResult<TxHash> {
    match result {
        LedgerCallResult::TransactionHash(tx) => Ok(tx),
        other => Err(unexpected(kind, &other)),
    }
}

fn unexpected(kind: LedgerCallKind, result: &LedgerCallResult) -> LedgerError {
    LedgerError::UnexpectedResult {
        call: kind.to_string(),
        got: format!("{:?}", result),
    }
}
