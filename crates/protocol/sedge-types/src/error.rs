//! Error types for data model validation.

use thiserror::Error;

/// Result type alias for data model operations.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised when constructing bounded protocol values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Account address is not `0x` followed by 40 hex characters.
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    /// Transaction hash is not `0x` followed by 64 hex characters.
    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    /// Payload does not fit the exchange buffer.
    #[error("payload too large: {size} > {max}")]
    PayloadTooLarge {
        /// Offered size
        size: usize,
        /// Buffer capacity
        max: usize,
    },

    /// Public key does not fit the key slot.
    #[error("public key too large: {size} > {max}")]
    PublicKeyTooLarge {
        /// Offered size
        size: usize,
        /// Slot capacity
        max: usize,
    },

    /// Public key text is empty or not PEM.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

impl TypesError {
    /// Create a new InvalidAddress error.
    pub fn invalid_address(value: impl Into<String>) -> Self {
        Self::InvalidAddress(value.into())
    }

    /// Create a new InvalidTxHash error.
    pub fn invalid_tx_hash(value: impl Into<String>) -> Self {
        Self::InvalidTxHash(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TypesError::PayloadTooLarge { size: 300, max: 256 };
        assert_eq!(err.to_string(), "payload too large: 300 > 256");

        let err = TypesError::invalid_address("0x12");
        assert_eq!(err.to_string(), "invalid account address: 0x12");
    }
}
