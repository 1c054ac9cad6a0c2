//! Configuration types for the operations layer.
//!
//! This module defines the timeouts and thresholds that govern the
//! producer pipeline, the coordinator and the consumer pipeline.

use sedge_types::constants::{
    CONSUMER_DRAIN_TIMEOUT_SECS, DEFAULT_INDICATOR_THRESHOLD, IDLE_INTERVAL_MS, PUSH_TIMEOUT_SECS,
    SERVE_DRAIN_TIMEOUT_SECS,
};
use sedge_types::duration_millis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{OpsError, OpsResult};

/// Exchange timing and indicator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// How long the producer waits to place ciphertext in its channel.
    /// Default: 2 seconds.
    #[serde(with = "duration_millis")]
    pub push_timeout: Duration,
    /// How long a `Data` request waits for the channel after `Success`.
    /// Default: 20 seconds.
    #[serde(with = "duration_millis")]
    pub serve_drain_timeout: Duration,
    /// How long one consumer pipeline round waits for ciphertext.
    /// Default: 5 seconds.
    #[serde(with = "duration_millis")]
    pub consumer_drain_timeout: Duration,
    /// Sleep between checks while the producer idles in a terminal state.
    /// Default: 1 second.
    #[serde(with = "duration_millis")]
    pub idle_interval: Duration,
    /// Readings at or above this value switch the indicator high.
    pub indicator_threshold: u8,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            push_timeout: Duration::from_secs(PUSH_TIMEOUT_SECS),
            serve_drain_timeout: Duration::from_secs(SERVE_DRAIN_TIMEOUT_SECS),
            consumer_drain_timeout: Duration::from_secs(CONSUMER_DRAIN_TIMEOUT_SECS),
            idle_interval: Duration::from_millis(IDLE_INTERVAL_MS),
            indicator_threshold: DEFAULT_INDICATOR_THRESHOLD,
        }
    }
}

impl ExchangeConfig {
    /// Set the producer push timeout.
    pub fn with_push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = timeout;
        self
    }

    /// Set the coordinator drain timeout.
    pub fn with_serve_drain_timeout(mut self, timeout: Duration) -> Self {
        self.serve_drain_timeout = timeout;
        self
    }

    /// Set the consumer drain timeout.
    pub fn with_consumer_drain_timeout(mut self, timeout: Duration) -> Self {
        self.consumer_drain_timeout = timeout;
        self
    }

    /// Set the idle interval.
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// Set the indicator threshold.
    pub fn with_indicator_threshold(mut self, threshold: u8) -> Self {
        self.indicator_threshold = threshold;
        self
    }

    /// Reject zero timeouts; every wait in the exchange must be bounded and
    /// make progress.
    pub fn validate(&self) -> OpsResult<()> {
        let timeouts = [
            ("push_timeout", self.push_timeout),
            ("serve_drain_timeout", self.serve_drain_timeout),
            ("consumer_drain_timeout", self.consumer_drain_timeout),
            ("idle_interval", self.idle_interval),
        ];
        for (name, value) in timeouts {
            if value.is_zero() {
                return Err(OpsError::Config(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }
}
