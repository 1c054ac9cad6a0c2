//! Error types for the ledger layer.

use sedge_types::TxHash;
use sedge_wire::WireError;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while talking to the ledger node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Request could not be encoded or the response could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// No response within the bounded wait (retryable).
    #[error("ledger timeout: {0}")]
    Timeout(String),

    /// Transport failure (retryable).
    #[error("network error: {0}")]
    Network(String),

    /// Transaction was mined with a failure status.
    #[error("transaction reverted: {0}")]
    TransactionReverted(TxHash),

    /// Transaction still pending after every poll.
    #[error("transaction {tx} unconfirmed after {attempts} attempts")]
    ConfirmationExhausted {
        /// Polled transaction
        tx: TxHash,
        /// Polls made
        attempts: u32,
    },

    /// Response decoded to a result of the wrong shape for the call.
    #[error("unexpected result for {call}: {got}")]
    UnexpectedResult {
        /// Call that was made
        call: String,
        /// Description of what came back
        got: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Create a new Timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new Network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
