//! Shared producer state.
//!
//! Everything the producer pipeline and the exchange coordinator share lives
//! in a [`ProducerContext`]. The producer state has a single writer: only the
//! [`ProducerStateWriter`] returned by [`ProducerContext::new`] can advance
//! the pipeline. Everyone else holds a [`ProducerStateView`], which can read
//! the state and perform the two external transitions (request a run, claim
//! a finished one).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sedge_types::ProducerState;
use tokio::sync::{watch, RwLock};
use tokio::time::timeout;
use tracing::debug;

use crate::auth_table::AuthTable;
use crate::channel::ExchangeChannel;

/// Set when an inbound address matches a known consumer, so the next run
/// can skip the ledger key read.
#[derive(Debug, Clone, Default)]
pub struct ConsumerAuthFlag(Arc<AtomicBool>);

impl ConsumerAuthFlag {
    /// Mark the current consumer as already authenticated.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// Current value.
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read access to the producer state plus the external triggers.
#[derive(Debug, Clone)]
pub struct ProducerStateView {
    tx: Arc<watch::Sender<ProducerState>>,
}

impl ProducerStateView {
    /// Current state.
    pub fn current(&self) -> ProducerState {
        *self.tx.borrow()
    }

    /// Ask the pipeline to start a run.
    ///
    /// A run already in progress is pre-empted and restarted.
    pub fn request_start(&self) {
        self.tx.send_modify(|state| {
            debug!(from = %state, "Producer run requested");
            *state = ProducerState::Start;
        });
    }

    /// Claim a finished run: `Success` becomes `Failed`.
    ///
    /// Returns `false` if the state was not `Success`, so only one caller can
    /// claim a given run.
    pub fn take_success(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == ProducerState::Success {
                *state = ProducerState::Failed;
                true
            } else {
                false
            }
        })
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ProducerState> {
        self.tx.subscribe()
    }
}

/// The pipeline's exclusive handle on the producer state.
#[derive(Debug)]
pub struct ProducerStateWriter {
    tx: Arc<watch::Sender<ProducerState>>,
}

impl ProducerStateWriter {
    /// Current state.
    pub fn current(&self) -> ProducerState {
        *self.tx.borrow()
    }

    /// Move from `from` to `to` if the state is still `from`.
    ///
    /// Returns `false` when an external trigger changed the state in the
    /// meantime.
    pub fn advance(&self, from: ProducerState, to: ProducerState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    /// Wait up to `idle` for a run to be requested.
    ///
    /// Returns whether the state is `Start`.
    pub async fn wait_for_start(&self, idle: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        let started = timeout(idle, rx.wait_for(|state| *state == ProducerState::Start)).await;
        matches!(started, Ok(Ok(_)))
    }
}

/// Handles shared by the producer pipeline and the exchange coordinator.
#[derive(Debug, Clone)]
pub struct ProducerContext {
    /// Known consumers.
    pub auth_table: Arc<RwLock<AuthTable>>,
    /// Set by the coordinator, consumed by the pipeline.
    pub auth_flag: ConsumerAuthFlag,
    /// Read side of the producer state.
    pub state: ProducerStateView,
    /// Prepared ciphertext waiting for a `Data` request.
    pub channel: Arc<ExchangeChannel>,
}

impl ProducerContext {
    /// Create a context in state `Failed` with an empty table and channel.
    pub fn new() -> (Self, ProducerStateWriter) {
        let (tx, _rx) = watch::channel(ProducerState::default());
        let tx = Arc::new(tx);
        let context = Self {
            auth_table: Arc::new(RwLock::new(AuthTable::new())),
            auth_flag: ConsumerAuthFlag::default(),
            state: ProducerStateView {
                tx: Arc::clone(&tx),
            },
            channel: Arc::new(ExchangeChannel::new()),
        };
        (context, ProducerStateWriter { tx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_failed() {
        let (context, writer) = ProducerContext::new();
        assert_eq!(context.state.current(), ProducerState::Failed);
        assert_eq!(writer.current(), ProducerState::Failed);
    }

    #[test]
    fn test_advance_is_compare_and_set() {
        let (context, writer) = ProducerContext::new();
        context.state.request_start();

        assert!(writer.advance(ProducerState::Start, ProducerState::Init));
        assert!(!writer.advance(ProducerState::Start, ProducerState::Init));

        // External restart while the run is in Init
        context.state.request_start();
        assert!(!writer.advance(ProducerState::Init, ProducerState::ReadConsumerKey));
        assert_eq!(writer.current(), ProducerState::Start);
    }

    #[test]
    fn test_take_success_once() {
        let (context, writer) = ProducerContext::new();
        assert!(!context.state.take_success());

        context.state.request_start();
        let mut state = ProducerState::Start;
        while let Some(next) = state.next() {
            assert!(writer.advance(state, next));
            state = next;
        }
        assert_eq!(state, ProducerState::Success);

        assert!(context.state.take_success());
        assert!(!context.state.take_success());
        assert_eq!(context.state.current(), ProducerState::Failed);
    }

    #[test]
    fn test_auth_flag_take() {
        let flag = ConsumerAuthFlag::default();
        assert!(!flag.take());
        flag.set();
        assert!(flag.clone().get());
        assert!(flag.take());
        assert!(!flag.get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_start() {
        let (context, writer) = ProducerContext::new();
        assert!(!writer.wait_for_start(Duration::from_secs(1)).await);

        let view = context.state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            view.request_start();
        });
        assert!(writer.wait_for_start(Duration::from_secs(1)).await);
    }
}
