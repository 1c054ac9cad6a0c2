//! Error types for the operations layer.
//!
//! This module defines the `OpsError` enum used by the pipelines, the
//! coordinator and the consumer client.

use sedge_crypto::CryptoError;
use sedge_ledger::LedgerError;
use sedge_net::NetworkError;
use sedge_types::{TxHash, TypesError};
use sedge_wire::{RequestMethod, WireError};
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = std::result::Result<T, OpsError>;

/// Errors that can occur during exchange operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    // =========================================================================
    // Channel Errors
    // =========================================================================
    /// The exchange channel stayed occupied for the whole push timeout.
    #[error("exchange channel full")]
    ChannelFull,

    /// The exchange channel stayed empty for the whole drain timeout.
    #[error("exchange channel empty")]
    ChannelEmpty,

    // =========================================================================
    // Exchange Errors
    // =========================================================================
    /// Only POST requests are served.
    #[error("unsupported request method: {0}")]
    UnsupportedMethod(RequestMethod),

    /// The consumer has not learned the producer's contract address yet.
    #[error("no contract address known")]
    NoContractAddress,

    /// An address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A payload exceeded its buffer.
    #[error("payload too large: {size} > {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// The producer answered with something the current step cannot use.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The consumer's key registration was not confirmed on the ledger.
    #[error("key registration not confirmed: {0}")]
    KeyNotConfirmed(TxHash),

    /// The consumer is waiting on a key registration it never submitted.
    #[error("no pending key registration")]
    NoPendingRegistration,

    /// The producer state was changed by someone else mid-run.
    #[error("producer run pre-empted")]
    Preempted,

    /// Configuration rejected by `validate`.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Decrypted payload carried no reading.
    #[error("empty reading")]
    EmptyReading,

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// Ledger call failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Hash or encryption failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Exchange transport failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Reply could not be parsed.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// A value violated a type bound.
    #[error("invalid value: {0}")]
    Types(TypesError),
}

impl From<TypesError> for OpsError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::PayloadTooLarge { size, max } => Self::PayloadTooLarge { size, max },
            TypesError::InvalidAddress(value) => Self::InvalidAddress(value),
            other => Self::Types(other),
        }
    }
}

impl OpsError {
    /// Check if this error is transient and the step may be retried later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ChannelFull | Self::ChannelEmpty => true,
            Self::Ledger(e) => e.is_retryable(),
            Self::Network(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OpsError::UnsupportedMethod(RequestMethod::Get);
        assert_eq!(err.to_string(), "unsupported request method: GET");

        let err = OpsError::PayloadTooLarge {
            size: 300,
            max: 256,
        };
        assert_eq!(err.to_string(), "payload too large: 300 > 256");
    }

    #[test]
    fn test_from_types_error() {
        let err: OpsError = TypesError::PayloadTooLarge {
            size: 300,
            max: 256,
        }
        .into();
        assert!(matches!(err, OpsError::PayloadTooLarge { size: 300, max: 256 }));
    }

    #[test]
    fn test_is_retryable() {
        assert!(OpsError::ChannelEmpty.is_retryable());
        assert!(OpsError::Ledger(LedgerError::timeout("x")).is_retryable());
        assert!(!OpsError::Crypto(CryptoError::NotSeeded).is_retryable());
        assert!(!OpsError::UnsupportedMethod(RequestMethod::Put).is_retryable());
    }
}
