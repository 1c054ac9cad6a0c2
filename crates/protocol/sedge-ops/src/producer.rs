//! Producer preparation pipeline.
//!
//! One run walks the states of [`ProducerState`] in order:
//!
//! ```text
//! Start → Init → ReadConsumerKey → ReadSensor → Encrypt → CalcHash
//!       → CommitHash → PushPayload → Success
//! ```
//!
//! A failing step moves the pipeline straight to `Failed`; no later step
//! runs. Every transition is a compare-and-set on the shared state, so an
//! external `Start` issued mid-run makes the next transition fail and the
//! pipeline begins again from `Start`.

use std::sync::Arc;

use sedge_crypto::{CryptoError, Hash};
use sedge_ledger::LedgerClient;
use sedge_types::{AccountAddress, ConsumerEntry, ExchangePayload, ProducerState};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ExchangeConfig;
use crate::context::{ProducerContext, ProducerStateWriter};
use crate::error::{OpsError, OpsResult};
use crate::sensor::{PayloadCrypto, Sensor};

/// Ledger identities the producer acts under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerAccounts {
    /// The producer's own account.
    pub producer: AccountAddress,
    /// The exchange contract.
    pub contract: AccountAddress,
}

/// What one run did.
#[derive(Debug)]
pub struct ProducerRun {
    /// States entered, in order, beginning with `Start`.
    pub states: Vec<ProducerState>,
    /// The step that failed and why.
    pub failure: Option<(ProducerState, OpsError)>,
    /// Whether an external trigger interrupted the run.
    pub preempted: bool,
}

impl ProducerRun {
    /// The last state entered.
    pub fn final_state(&self) -> Option<ProducerState> {
        self.states.last().copied()
    }

    /// Whether the run reached `Success`.
    pub fn succeeded(&self) -> bool {
        self.final_state() == Some(ProducerState::Success)
    }
}

/// Per-run working buffers.
#[derive(Default)]
struct RunBuffers {
    sample: Option<u8>,
    ciphertext: Vec<u8>,
    digest: Option<Hash>,
}

/// Drives [`ProducerState`] through one preparation run at a time.
pub struct ProducerPipeline {
    context: ProducerContext,
    state: ProducerStateWriter,
    ledger: Arc<LedgerClient>,
    crypto: Arc<dyn PayloadCrypto>,
    sensor: Arc<dyn Sensor>,
    accounts: ProducerAccounts,
    config: ExchangeConfig,
}

impl ProducerPipeline {
    /// Create a pipeline. `state` must be the writer paired with `context`.
    pub fn new(
        context: ProducerContext,
        state: ProducerStateWriter,
        ledger: Arc<LedgerClient>,
        crypto: Arc<dyn PayloadCrypto>,
        sensor: Arc<dyn Sensor>,
        accounts: ProducerAccounts,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            context,
            state,
            ledger,
            crypto,
            sensor,
            accounts,
            config,
        }
    }

    /// The shared context.
    pub fn context(&self) -> &ProducerContext {
        &self.context
    }

    /// Execute one run if the state is `Start`.
    ///
    /// Returns an empty run when there is nothing to do.
    pub async fn run_once(&self) -> ProducerRun {
        let mut run = ProducerRun {
            states: Vec::new(),
            failure: None,
            preempted: false,
        };
        if self.state.current() != ProducerState::Start {
            return run;
        }

        info!(contract = %self.accounts.contract, "Producer run started");
        let mut state = ProducerState::Start;
        let mut work = RunBuffers::default();
        run.states.push(state);

        while let Some(next) = state.next() {
            let target = match self.execute(state, &mut work).await {
                Ok(()) => next,
                Err(OpsError::Preempted) => {
                    info!(state = %state, now = %self.state.current(), "Producer run pre-empted");
                    run.preempted = true;
                    return run;
                }
                Err(e) => {
                    warn!(state = %state, error = %e, "Producer step failed");
                    run.failure = Some((state, e));
                    ProducerState::Failed
                }
            };

            if !self.state.advance(state, target) {
                info!(state = %state, now = %self.state.current(), "Producer run pre-empted");
                run.preempted = true;
                return run;
            }
            debug!(from = %state, to = %target, "Producer state advanced");

            run.states.push(target);
            state = target;
        }

        if state == ProducerState::Success {
            info!("Producer run succeeded, ciphertext ready");
        }
        run
    }

    /// Run until `shutdown` becomes `true`, idling between runs.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(producer = %self.accounts.producer, "Producer pipeline running");
        loop {
            if *shutdown.borrow() {
                break;
            }

            if self.state.current() == ProducerState::Start {
                tokio::select! {
                    _ = self.run_once() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                continue;
            }

            tokio::select! {
                _ = self.state.wait_for_start(self.config.idle_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Producer pipeline stopped");
    }

    async fn execute(&self, state: ProducerState, work: &mut RunBuffers) -> OpsResult<()> {
        match state {
            ProducerState::Start => {
                *work = RunBuffers::default();
                Ok(())
            }
            ProducerState::Init => Ok(()),
            ProducerState::ReadConsumerKey => self.read_consumer_key().await,
            ProducerState::ReadSensor => {
                let sample = self.sensor.sample_averaged();
                debug!(sample, "Sensor sampled");
                work.sample = Some(sample);
                Ok(())
            }
            ProducerState::Encrypt => {
                let sample = work.sample.ok_or(OpsError::EmptyReading)?;
                let active = self.context.auth_table.write().await.take_active();
                work.ciphertext = self.crypto.encrypt_for(active.as_ref(), &[sample])?;
                Ok(())
            }
            ProducerState::CalcHash => {
                work.digest = Some(self.crypto.hash(&work.ciphertext)?);
                Ok(())
            }
            ProducerState::CommitHash => {
                let digest = work
                    .digest
                    .ok_or_else(|| CryptoError::hash("no digest computed"))?;
                let tx = self
                    .ledger
                    .write_data_hash(&self.accounts.producer, &self.accounts.contract, digest.as_bytes())
                    .await?;
                debug!(%tx, hash = %digest, "Data hash submitted");
                self.ledger.await_confirmation(&tx).await?;
                Ok(())
            }
            ProducerState::PushPayload => {
                let payload = ExchangePayload::from_vec(std::mem::take(&mut work.ciphertext))?;
                if self.context.channel.clear().await {
                    debug!("Discarded stale ciphertext");
                }
                self.context
                    .channel
                    .push(payload, self.config.push_timeout)
                    .await
            }
            ProducerState::Success | ProducerState::Failed => Ok(()),
        }
    }

    async fn read_consumer_key(&self) -> OpsResult<()> {
        if self.context.auth_flag.take() {
            debug!("Consumer already authenticated, skipping key read");
            return Ok(());
        }

        let key = self
            .ledger
            .read_public_key(&self.accounts.producer, &self.accounts.contract)
            .await?;
        let entry = ConsumerEntry::new(key.address, key.public_key_pem)?;

        // The coordinator restarts runs while holding the table lock, so the
        // state checked here cannot change before the entry is installed.
        let mut table = self.context.auth_table.write().await;
        if self.state.current() != ProducerState::ReadConsumerKey {
            debug!(consumer = %entry.address, "Run restarted during key read, discarding key");
            return Err(OpsError::Preempted);
        }
        info!(consumer = %entry.address, "Consumer key read from ledger");
        table.push_front(entry);
        table.record_authenticated(0);
        Ok(())
    }
}

impl std::fmt::Debug for ProducerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerPipeline")
            .field("accounts", &self.accounts)
            .field("state", &self.state.current())
            .finish()
    }
}
