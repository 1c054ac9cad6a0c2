//! Consumer verification pipeline.
//!
//! Each round takes one ciphertext from the consumer's channel, decrypts it,
//! checks its hash against the value the producer committed on the ledger,
//! and votes on the producer accordingly.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use sedge_crypto::{CryptoOps, Hash};
use sedge_ledger::LedgerClient;
use sedge_types::{AccountAddress, ExchangePayload, ExchangeStep, IndicatorLevel, TxHash};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::channel::ExchangeChannel;
use crate::config::ExchangeConfig;
use crate::error::{OpsError, OpsResult};
use crate::sensor::Indicator;

/// State shared by [`ConsumerClient`](crate::ConsumerClient) and
/// [`ConsumerPipeline`].
#[derive(Debug, Default)]
pub struct ConsumerSession {
    contract: RwLock<Option<AccountAddress>>,
    step: AtomicU8,
    authenticated: AtomicBool,
    pending_key_tx: Mutex<Option<TxHash>>,
    channel: ExchangeChannel,
}

impl ConsumerSession {
    /// A session at `RequestAddress` with nothing learned yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position in the request sequence.
    pub fn step(&self) -> ExchangeStep {
        ExchangeStep::from_u8(self.step.load(Ordering::SeqCst)).unwrap_or_default()
    }

    /// Move to `step`.
    pub fn set_step(&self, step: ExchangeStep) {
        self.step.store(step as u8, Ordering::SeqCst);
    }

    /// Return to the first request of the sequence.
    pub fn reset_step(&self) {
        self.set_step(ExchangeStep::RequestAddress);
    }

    /// Contract address learned from the producer.
    pub async fn contract(&self) -> Option<AccountAddress> {
        self.contract.read().await.clone()
    }

    /// Record the producer's contract address.
    pub async fn set_contract(&self, contract: AccountAddress) {
        *self.contract.write().await = Some(contract);
    }

    /// Whether the producer already holds this consumer's key.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Record whether the producer already holds this consumer's key.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    /// Remember the key registration awaiting confirmation.
    pub async fn set_pending_key_tx(&self, tx: Option<TxHash>) {
        *self.pending_key_tx.lock().await = tx;
    }

    /// Take the key registration awaiting confirmation.
    pub async fn take_pending_key_tx(&self) -> Option<TxHash> {
        self.pending_key_tx.lock().await.take()
    }

    /// Ciphertext received from the producer, waiting for verification.
    pub fn channel(&self) -> &ExchangeChannel {
        &self.channel
    }
}

/// Outcome of one verified ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Decrypted reading.
    pub reading: u8,
    /// Level the indicator was switched to.
    pub level: IndicatorLevel,
    /// Whether the ciphertext hash equals the committed hash.
    pub matched: bool,
    /// Transaction carrying the vote.
    pub vote_tx: TxHash,
}

/// Verifies ciphertext delivered through the session channel.
pub struct ConsumerPipeline {
    session: Arc<ConsumerSession>,
    ledger: Arc<LedgerClient>,
    crypto: Arc<CryptoOps>,
    indicator: Arc<dyn Indicator>,
    account: AccountAddress,
    config: ExchangeConfig,
}

impl ConsumerPipeline {
    /// Create a pipeline voting as `account`.
    pub fn new(
        session: Arc<ConsumerSession>,
        ledger: Arc<LedgerClient>,
        crypto: Arc<CryptoOps>,
        indicator: Arc<dyn Indicator>,
        account: AccountAddress,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            session,
            ledger,
            crypto,
            indicator,
            account,
            config,
        }
    }

    /// Verify one ciphertext and vote on it.
    pub async fn process(&self, payload: &ExchangePayload) -> OpsResult<Verification> {
        let contract = self
            .session
            .contract()
            .await
            .ok_or(OpsError::NoContractAddress)?;

        let committed = self.ledger.read_data_hash(&self.account, &contract).await?;
        let plaintext = self.crypto.decrypt_own(payload.as_bytes())?;
        let reading = *plaintext.first().ok_or(OpsError::EmptyReading)?;

        let level = IndicatorLevel::for_reading(reading, self.config.indicator_threshold);
        self.indicator.set_level(level);
        debug!(reading, ?level, "Reading decrypted");

        let digest = self.crypto.hash(payload.as_bytes())?;
        let matched = digest.as_bytes()[..] == committed[..];
        if !matched {
            warn!(
                computed = %digest,
                committed = ?Hash::from_slice(&committed).ok(),
                "Ciphertext hash does not match ledger"
            );
        }

        let vote_tx = self
            .ledger
            .rate_producer(&self.account, &contract, matched)
            .await?;
        info!(matched, %vote_tx, "Vote cast");

        Ok(Verification {
            reading,
            level,
            matched,
            vote_tx,
        })
    }

    /// Wait for one ciphertext and verify it.
    ///
    /// `Ok(None)` means nothing arrived within the drain timeout. A failed
    /// verification resets the session's request sequence.
    pub async fn next_round(&self) -> OpsResult<Option<Verification>> {
        let payload = match self
            .session
            .channel()
            .drain(self.config.consumer_drain_timeout)
            .await
        {
            Ok(payload) => payload,
            Err(OpsError::ChannelEmpty) => return Ok(None),
            Err(e) => return Err(e),
        };

        match self.process(&payload).await {
            Ok(verification) => Ok(Some(verification)),
            Err(e) => {
                warn!(error = %e, "Verification failed, restarting exchange");
                self.session.reset_step();
                Err(e)
            }
        }
    }

    /// Run rounds until `shutdown` becomes `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(consumer = %self.account, "Consumer pipeline running");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                // Errors are logged and already reset the sequence
                _ = self.next_round() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Consumer pipeline stopped");
    }
}

impl std::fmt::Debug for ConsumerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerPipeline")
            .field("account", &self.account)
            .field("step", &self.session.step())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_step_cycle() {
        let session = ConsumerSession::new();
        assert_eq!(session.step(), ExchangeStep::RequestAddress);

        session.set_step(ExchangeStep::RequestData);
        assert_eq!(session.step(), ExchangeStep::RequestData);

        session.reset_step();
        assert_eq!(session.step(), ExchangeStep::RequestAddress);
    }

    #[tokio::test]
    async fn test_session_contract_and_pending_tx() {
        let session = ConsumerSession::new();
        assert!(session.contract().await.is_none());

        let contract = AccountAddress::parse("0x3333333333333333333333333333333333333333").unwrap();
        session.set_contract(contract.clone()).await;
        assert_eq!(session.contract().await, Some(contract));

        let tx = TxHash::parse(&format!("0x{:064x}", 7)).unwrap();
        session.set_pending_key_tx(Some(tx.clone())).await;
        assert_eq!(session.take_pending_key_tx().await, Some(tx));
        assert_eq!(session.take_pending_key_tx().await, None);
    }

    #[test]
    fn test_session_authenticated_flag() {
        let session = ConsumerSession::new();
        assert!(!session.is_authenticated());
        session.set_authenticated(true);
        assert!(session.is_authenticated());
    }
}
