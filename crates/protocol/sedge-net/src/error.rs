//! Network error types.
//!
//! This module defines all error types for the sedge-net crate.

use sedge_wire::WireError;
use thiserror::Error;

/// Network-specific errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkError {
    /// Failed to bind the listening socket.
    #[error("bind failed: {0}")]
    Bind(String),

    /// Failed to connect to peer.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Frame larger than the configured maximum.
    #[error("frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// Failed to encode message.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Failed to decode message.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Peer closed the connection before replying.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    /// Whether a fresh attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout(_) | Self::ConnectionClosed | Self::Io(_)
        )
    }
}

impl From<WireError> for NetworkError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::EncodingOverflow { size, max } => Self::FrameTooLarge { size, max },
            WireError::Decode(msg) => Self::Decoding(msg),
            other => Self::Encoding(other.to_string()),
        }
    }
}

/// Result type for network operations.
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
