//! Consumer request sequencer.
//!
//! [`ConsumerClient::advance`] performs the request for the session's current
//! step and moves the step on:
//!
//! ```text
//! RequestAddress ──▶ AnnounceKey ──▶ RequestData ──▶ RequestAddress
//! ```
//!
//! A new consumer registers its public key on the ledger after the address
//! request and announces it only once the registration is confirmed. A
//! consumer the producer already knows skips the announcement.

use std::net::SocketAddr;
use std::sync::Arc;

use sedge_ledger::LedgerClient;
use sedge_net::ExchangeTransport;
use sedge_types::{AccountAddress, ExchangePayload, ExchangeStep, DEFAULT_REQUEST_PAYLOAD};
use sedge_wire::exchange::{options, replies};
use sedge_wire::{ExchangeRequest, ProducerReply};
use tracing::{debug, info, warn};

use crate::consumer::ConsumerSession;
use crate::error::{OpsError, OpsResult};

/// Drives the consumer side of the exchange against one producer.
pub struct ConsumerClient {
    session: Arc<ConsumerSession>,
    transport: Arc<dyn ExchangeTransport>,
    ledger: Arc<LedgerClient>,
    producer: SocketAddr,
    account: AccountAddress,
    public_key_pem: String,
}

impl ConsumerClient {
    /// Create a client for the producer at `producer`.
    pub fn new(
        session: Arc<ConsumerSession>,
        transport: Arc<dyn ExchangeTransport>,
        ledger: Arc<LedgerClient>,
        producer: SocketAddr,
        account: AccountAddress,
        public_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            session,
            transport,
            ledger,
            producer,
            account,
            public_key_pem: public_key_pem.into(),
        }
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<ConsumerSession> {
        &self.session
    }

    /// Perform the current step. Returns the step the session moved to.
    ///
    /// On error the step is left where it was, except that an unconfirmed
    /// key registration sends the session back to `RequestAddress`.
    pub async fn advance(&self) -> OpsResult<ExchangeStep> {
        let step = self.session.step();
        debug!(?step, "Advancing exchange");

        let next = match step {
            ExchangeStep::RequestAddress => self.request_address().await?,
            ExchangeStep::AnnounceKey => self.announce_key().await?,
            ExchangeStep::RequestData => self.request_data().await?,
        };

        self.session.set_step(next);
        Ok(next)
    }

    async fn request_address(&self) -> OpsResult<ExchangeStep> {
        let reply = self
            .send(options::CONTRACT_ADDRESS, Some(self.account.as_str().as_bytes()))
            .await?;

        match reply {
            ProducerReply::ContractAddress(contract) => {
                info!(%contract, "Producer does not know us, registering key");
                self.session.set_contract(contract.clone()).await;
                self.session.set_authenticated(false);

                let tx = self
                    .ledger
                    .write_public_key(&self.account, &contract, &self.public_key_pem)
                    .await?;
                debug!(%tx, "Key registration submitted");
                self.session.set_pending_key_tx(Some(tx)).await;
                Ok(ExchangeStep::AnnounceKey)
            }
            ProducerReply::AlreadyAuthenticated(contract) => {
                info!(%contract, "Producer already holds our key");
                self.session.set_contract(contract).await;
                self.session.set_authenticated(true);
                Ok(ExchangeStep::AnnounceKey)
            }
            other => Err(OpsError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    async fn announce_key(&self) -> OpsResult<ExchangeStep> {
        if self.session.is_authenticated() {
            return Ok(ExchangeStep::RequestData);
        }

        let Some(tx) = self.session.take_pending_key_tx().await else {
            self.session.reset_step();
            return Err(OpsError::NoPendingRegistration);
        };

        if !self.ledger.wait_for_confirmation(&tx).await {
            self.session.reset_step();
            return Err(OpsError::KeyNotConfirmed(tx));
        }

        match self.send(options::PUBLIC_KEY_AVAILABLE, None).await? {
            ProducerReply::Status(text) if text == replies::PREPARE_PAYLOAD => {}
            other => warn!(reply = ?other, "Unexpected key announcement reply"),
        }
        Ok(ExchangeStep::RequestData)
    }

    async fn request_data(&self) -> OpsResult<ExchangeStep> {
        match self.send(options::DATA, None).await? {
            ProducerReply::Data(ciphertext) => {
                info!(len = ciphertext.len(), "Ciphertext received");
                let payload = ExchangePayload::from_vec(ciphertext)?;
                self.session.channel().try_push(payload).await?;
                Ok(ExchangeStep::RequestAddress)
            }
            ProducerReply::Status(text)
                if text == replies::PROCESSING_STARTED || text == replies::PROCESSING_IN_PROGRESS =>
            {
                debug!(status = %text, "Producer still preparing");
                Ok(ExchangeStep::RequestData)
            }
            ProducerReply::Status(text) => {
                info!(status = %text, "Producer has no data, restarting exchange");
                Ok(ExchangeStep::RequestAddress)
            }
            other => Err(OpsError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    async fn send(&self, option: &str, payload: Option<&[u8]>) -> OpsResult<ProducerReply> {
        let payload = payload.unwrap_or(DEFAULT_REQUEST_PAYLOAD).to_vec();
        let response = self
            .transport
            .request(self.producer, ExchangeRequest::post(option, payload))
            .await?;
        Ok(ProducerReply::parse(&response.payload)?)
    }
}

impl std::fmt::Debug for ConsumerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerClient")
            .field("producer", &self.producer)
            .field("account", &self.account)
            .field("step", &self.session.step())
            .finish()
    }
}
