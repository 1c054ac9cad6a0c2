//! Single-slot exchange channel.
//!
//! Carries one ciphertext at a time between the task that prepares it and
//! the task that serves or verifies it. A push into an occupied slot waits
//! for the slot to free up and fails with [`OpsError::ChannelFull`] when its
//! timeout elapses; it never replaces the waiting payload. Callers that want
//! replacement call [`ExchangeChannel::clear`] first.

use sedge_types::ExchangePayload;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout_at, Instant};
use tracing::trace;

use crate::error::{OpsError, OpsResult};

/// Capacity-one handoff for exchange payloads.
#[derive(Debug, Default)]
pub struct ExchangeChannel {
    slot: Mutex<Option<ExchangePayload>>,
    item_ready: Notify,
    slot_free: Notify,
}

impl ExchangeChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `payload` in the slot, waiting up to `timeout` for it to be free.
    pub async fn push(&self, payload: ExchangePayload, timeout: Duration) -> OpsResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let freed = self.slot_free.notified();
            tokio::pin!(freed);
            freed.as_mut().enable();

            {
                let mut slot = self.slot.lock().await;
                if slot.is_none() {
                    trace!(len = payload.len(), "Payload pushed");
                    *slot = Some(payload);
                    self.item_ready.notify_one();
                    return Ok(());
                }
            }

            if timeout_at(deadline, freed).await.is_err() {
                return Err(OpsError::ChannelFull);
            }
        }
    }

    /// Place `payload` in the slot only if it is free right now.
    pub async fn try_push(&self, payload: ExchangePayload) -> OpsResult<()> {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            return Err(OpsError::ChannelFull);
        }
        *slot = Some(payload);
        self.item_ready.notify_one();
        Ok(())
    }

    /// Take the payload, waiting up to `timeout` for one to arrive.
    pub async fn drain(&self, timeout: Duration) -> OpsResult<ExchangePayload> {
        let deadline = Instant::now() + timeout;
        loop {
            let ready = self.item_ready.notified();
            tokio::pin!(ready);
            ready.as_mut().enable();

            if let Some(payload) = self.try_drain().await {
                return Ok(payload);
            }

            if timeout_at(deadline, ready).await.is_err() {
                return Err(OpsError::ChannelEmpty);
            }
        }
    }

    /// Take the payload if one is waiting.
    pub async fn try_drain(&self) -> Option<ExchangePayload> {
        let payload = self.slot.lock().await.take();
        if payload.is_some() {
            trace!("Payload drained");
            self.slot_free.notify_one();
        }
        payload
    }

    /// Discard any waiting payload. Returns whether one was discarded.
    pub async fn clear(&self) -> bool {
        self.try_drain().await.is_some()
    }

    /// Whether the slot is free.
    pub async fn is_empty(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn payload(byte: u8) -> ExchangePayload {
        ExchangePayload::new(&[byte; 4]).unwrap()
    }

    #[tokio::test]
    async fn test_push_then_drain() {
        let channel = ExchangeChannel::new();
        channel.push(payload(1), Duration::from_secs(1)).await.unwrap();
        assert!(!channel.is_empty().await);

        let drained = channel.drain(Duration::from_secs(1)).await.unwrap();
        assert_eq!(drained.as_bytes(), &[1, 1, 1, 1]);
        assert!(channel.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_push_blocks_until_timeout() {
        let channel = ExchangeChannel::new();
        channel.push(payload(1), Duration::from_secs(2)).await.unwrap();

        let start = Instant::now();
        let err = channel.push(payload(2), Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, OpsError::ChannelFull));
        assert!(start.elapsed() >= Duration::from_secs(2));

        // First payload is untouched
        let drained = channel.drain(Duration::from_secs(1)).await.unwrap();
        assert_eq!(drained.as_bytes(), &[1, 1, 1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_push_completes_after_drain() {
        let channel = Arc::new(ExchangeChannel::new());
        channel.push(payload(1), Duration::from_secs(1)).await.unwrap();

        let pusher = {
            let channel = Arc::clone(&channel);
            tokio::spawn(async move { channel.push(payload(2), Duration::from_secs(10)).await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        let first = channel.drain(Duration::from_secs(1)).await.unwrap();
        assert_eq!(first.as_bytes()[0], 1);

        pusher.await.unwrap().unwrap();
        let second = channel.drain(Duration::from_secs(1)).await.unwrap();
        assert_eq!(second.as_bytes()[0], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_times_out_when_empty() {
        let channel = ExchangeChannel::new();
        let start = Instant::now();
        let err = channel.drain(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, OpsError::ChannelEmpty));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_wakes_on_push() {
        let channel = Arc::new(ExchangeChannel::new());
        let drainer = {
            let channel = Arc::clone(&channel);
            tokio::spawn(async move { channel.drain(Duration::from_secs(20)).await })
        };

        tokio::time::sleep(Duration::from_secs(3)).await;
        channel.push(payload(9), Duration::from_secs(1)).await.unwrap();

        let drained = drainer.await.unwrap().unwrap();
        assert_eq!(drained.as_bytes()[0], 9);
    }

    #[tokio::test]
    async fn test_try_push_fails_immediately_when_full() {
        let channel = ExchangeChannel::new();
        channel.try_push(payload(1)).await.unwrap();
        assert!(matches!(
            channel.try_push(payload(2)).await,
            Err(OpsError::ChannelFull)
        ));
    }

    #[tokio::test]
    async fn test_clear_then_push_replaces() {
        let channel = ExchangeChannel::new();
        channel.try_push(payload(1)).await.unwrap();

        assert!(channel.clear().await);
        assert!(!channel.clear().await);
        channel.push(payload(2), Duration::from_secs(1)).await.unwrap();

        assert_eq!(channel.try_drain().await.unwrap().as_bytes()[0], 2);
    }
}
