//! Error types for sedge-crypto

use thiserror::Error;

/// Result type alias for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Digest could not be produced or does not fit the destination
    #[error("hash error: {0}")]
    Hash(String),

    /// Key material could not be parsed, or no key is available
    #[error("key parse error: {0}")]
    KeyParse(String),

    /// Encryption primitive failed
    #[error("encrypt error: {0}")]
    Encrypt(String),

    /// Decryption primitive failed
    #[error("decrypt error: {0}")]
    Decrypt(String),

    /// Random generator used before seeding
    #[error("random generator not seeded")]
    NotSeeded,

    /// Random generator seeded twice
    #[error("random generator already seeded")]
    AlreadySeeded,

    /// Key generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

impl CryptoError {
    /// Create a new Hash error.
    pub fn hash(msg: impl Into<String>) -> Self {
        Self::Hash(msg.into())
    }

    /// Create a new KeyParse error.
    pub fn key_parse(msg: impl Into<String>) -> Self {
        Self::KeyParse(msg.into())
    }

    /// Create a new Encrypt error.
    pub fn encrypt(msg: impl Into<String>) -> Self {
        Self::Encrypt(msg.into())
    }

    /// Create a new Decrypt error.
    pub fn decrypt(msg: impl Into<String>) -> Self {
        Self::Decrypt(msg.into())
    }
}
