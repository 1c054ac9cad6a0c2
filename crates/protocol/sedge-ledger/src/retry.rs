//! Bounded retry and polling.
//!
//! One policy type serves both failure retries ([`RetryPolicy::execute`])
//! and "not ready yet" polling ([`RetryPolicy::poll`]). Neither loops
//! forever: after `max_attempts` the caller gets an answer and decides
//! whether to abandon the attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{Backoff, RetryConfig};
use crate::error::{LedgerError, LedgerResult};

/// Retry policy with fixed or exponential delays.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,
    /// Delay before the second attempt
    base_delay: Duration,
    /// Maximum delay between attempts
    max_delay: Duration,
    /// Delay growth
    backoff: Backoff,
}

impl RetryPolicy {
    /// Create an exponential policy.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Create a fixed-interval policy.
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self::from_config(&RetryConfig::fixed(max_attempts, interval))
    }

    /// Create from retry config.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: config.base_delay,
            max_delay: config.max_delay,
            backoff: config.backoff,
        }
    }

    /// Maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Calculate the delay for a given attempt (0-indexed).
    ///
    /// Exponential delays carry +-25% jitter; fixed delays are exact.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        match self.backoff {
            Backoff::Fixed => std::cmp::min(self.base_delay, self.max_delay),
            Backoff::Exponential => {
                let multiplier = 2u32.saturating_pow(attempt - 1);
                let capped = std::cmp::min(self.base_delay.saturating_mul(multiplier), self.max_delay);

                let jitter_range = capped.as_millis() as u64 / 4;
                if jitter_range == 0 {
                    return capped;
                }
                let jitter = rand::random::<u64>() % (jitter_range * 2);
                let jittered_ms = (capped.as_millis() as u64)
                    .saturating_sub(jitter_range)
                    .saturating_add(jitter);
                Duration::from_millis(jittered_ms)
            }
        }
    }

    /// Execute an async operation, retrying retryable errors.
    ///
    /// Returns immediately on non-retryable errors.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> LedgerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            let delay = self.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(attempt, ?delay, "Retrying after delay");
                sleep(delay).await;
            }

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if e.is_retryable() && attempt + 1 < self.max_attempts {
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            error = %e,
                            "Retryable error, will retry"
                        );
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LedgerError::timeout("no attempts allowed")))
    }

    /// Poll an operation until it yields a value.
    ///
    /// `Ok(None)` from the operation means "not ready"; the next attempt
    /// follows after the policy delay. Any error ends polling at once.
    /// Returns `Ok(None)` when every attempt came back not ready.
    pub async fn poll<F, Fut, T>(&self, mut operation: F) -> LedgerResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<Option<T>>>,
    {
        for attempt in 0..self.max_attempts {
            let delay = self.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(attempt, ?delay, "Polling again after delay");
                sleep(delay).await;
            }

            if let Some(value) = operation().await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
