//! Ledger client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use sedge_types::{
    CONFIRMATION_ATTEMPTS, CONFIRMATION_INTERVAL_SECS, LEDGER_REQUEST_CAPACITY,
    LEDGER_RESPONSE_TIMEOUT_SECS,
};
use sedge_wire::{DEFAULT_GAS, DEFAULT_KEY_DEPOSIT};

use crate::error::{LedgerError, LedgerResult};

/// Default ledger node endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8545";

/// Default path requests are posted to.
pub const DEFAULT_POST_PATH: &str = "/post";

/// How delays grow between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay every time.
    Fixed,
    /// Doubling delay with jitter, capped at `max_delay`.
    Exponential,
}

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before the second attempt
    #[serde(with = "sedge_types::duration_millis")]
    pub base_delay: Duration,
    /// Upper bound on any delay
    #[serde(with = "sedge_types::duration_millis")]
    pub max_delay: Duration,
    /// Delay growth
    pub backoff: Backoff,
}

impl RetryConfig {
    /// Fixed-interval polling.
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: interval,
            max_delay: interval,
            backoff: Backoff::Fixed,
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        Self::fixed(1, Duration::ZERO)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff: Backoff::Exponential,
        }
    }
}

/// Configuration for talking to the ledger node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Base URL of the ledger node.
    pub endpoint: String,
    /// Path requests are posted to.
    pub post_path: String,
    /// Bounded wait for each response.
    #[serde(with = "sedge_types::duration_millis")]
    pub response_timeout: Duration,
    /// Gas limit attached to every call.
    pub gas: String,
    /// Value attached to public key registration.
    pub key_deposit: String,
    /// Maximum encoded request size.
    pub request_capacity: usize,
    /// Retries of a single call on transport failure.
    pub request_retry: RetryConfig,
    /// Receipt polling.
    pub confirmation: RetryConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            post_path: DEFAULT_POST_PATH.to_string(),
            response_timeout: Duration::from_secs(LEDGER_RESPONSE_TIMEOUT_SECS),
            gas: DEFAULT_GAS.to_string(),
            key_deposit: DEFAULT_KEY_DEPOSIT.to_string(),
            request_capacity: LEDGER_REQUEST_CAPACITY,
            request_retry: RetryConfig::none(),
            confirmation: RetryConfig::fixed(
                CONFIRMATION_ATTEMPTS,
                Duration::from_secs(CONFIRMATION_INTERVAL_SECS),
            ),
        }
    }
}

impl LedgerConfig {
    /// Create a config for an endpoint with default timing.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the response timeout.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the retry policy for reads and receipt polls.
    pub fn with_request_retry(mut self, request_retry: RetryConfig) -> Self {
        self.request_retry = request_retry;
        self
    }

    /// Set the confirmation polling policy.
    pub fn with_confirmation(mut self, confirmation: RetryConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Full URL requests are posted to.
    pub fn post_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), self.post_path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LedgerResult<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(LedgerError::config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        if !self.post_path.starts_with('/') {
            return Err(LedgerError::config(format!(
                "post path must start with '/': {}",
                self.post_path
            )));
        }
        if self.response_timeout.is_zero() {
            return Err(LedgerError::config("response timeout must be non-zero"));
        }
        for (name, hex) in [("gas", &self.gas), ("key deposit", &self.key_deposit)] {
            let digits = hex.strip_prefix("0x").unwrap_or("");
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(LedgerError::config(format!("{} must be 0x-prefixed hex: {}", name, hex)));
            }
        }
        if self.request_retry.max_attempts == 0 || self.confirmation.max_attempts == 0 {
            return Err(LedgerError::config("retry policies need at least one attempt"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LedgerConfig::default();
        assert_eq!(config.response_timeout, Duration::from_secs(10));
        assert_eq!(config.confirmation.max_attempts, 5);
        assert_eq!(config.confirmation.base_delay, Duration::from_secs(5));
        assert_eq!(config.confirmation.backoff, Backoff::Fixed);
        assert_eq!(config.request_retry.max_attempts, 1);
        assert_eq!(config.gas, "0x47E7C0");
        config.validate().unwrap();
    }

    #[test]
    fn test_post_url() {
        let config = LedgerConfig::new("http://10.0.0.5:3000/");
        assert_eq!(config.post_url(), "http://10.0.0.5:3000/post");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(LedgerConfig::new("10.0.0.5:3000").validate().is_err());

        let mut config = LedgerConfig::default();
        config.gas = "47E7C0".to_string();
        assert!(config.validate().is_err());

        let config = LedgerConfig::default().with_response_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = LedgerConfig::default().with_confirmation(RetryConfig::fixed(0, Duration::ZERO));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_partial() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"endpoint":"http://node:8545","response_timeout":2500}"#)
                .unwrap();
        assert_eq!(config.endpoint, "http://node:8545");
        assert_eq!(config.response_timeout, Duration::from_millis(2500));
        assert_eq!(config.post_path, DEFAULT_POST_PATH);
    }
}
