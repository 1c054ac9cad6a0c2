//! Error types for wire encoding and decoding.

use sedge_types::LedgerCallKind;
use thiserror::Error;

/// Result type alias for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors produced while encoding ledger calls or decoding responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Encoded request would not fit the request buffer.
    #[error("encoding overflow: {size} bytes exceeds capacity {max}")]
    EncodingOverflow {
        /// Encoded size
        size: usize,
        /// Buffer capacity
        max: usize,
    },

    /// Response is missing fields, has the wrong shape, or does not fit its destination.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A write-style call was encoded without its payload.
    #[error("{0} requires a payload")]
    MissingPayload(LedgerCallKind),

    /// The ledger node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// Exchange frame could not be serialized.
    #[error("frame encode failed: {0}")]
    Encode(String),

    /// Exchange frame could not be deserialized.
    #[error("frame decode failed: {0}")]
    Decode(String),
}

impl WireError {
    /// Create a new MalformedResponse error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WireError::EncodingOverflow {
            size: 3000,
            max: 2048,
        };
        assert_eq!(
            err.to_string(),
            "encoding overflow: 3000 bytes exceeds capacity 2048"
        );
        assert_eq!(
            WireError::MissingPayload(LedgerCallKind::WriteDataHash).to_string(),
            "write_data_hash requires a payload"
        );
    }
}
