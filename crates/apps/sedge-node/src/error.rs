//! Node error types.

use std::path::PathBuf;
use thiserror::Error;

/// Node result type.
pub type NodeResult<T> = Result<T, NodeError>;

/// Node error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Refusing to overwrite an existing file.
    #[error("{} already exists. Pass --force to overwrite.", .0.display())]
    AlreadyExists(PathBuf),

    /// Key file missing or unreadable.
    #[error("Cannot read key file {}: {source}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operations error.
    #[error("{0}")]
    Ops(#[from] sedge_ops::OpsError),

    /// Ledger error.
    #[error("{0}")]
    Ledger(#[from] sedge_ledger::LedgerError),

    /// Network error.
    #[error("{0}")]
    Network(#[from] sedge_net::NetworkError),

    /// Cryptography error.
    #[error("{0}")]
    Crypto(#[from] sedge_crypto::CryptoError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl NodeError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors: 1
            Self::AlreadyExists(_) => 1,
            // Missing files: 2
            Self::KeyFile { .. } => 2,
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) => 3,
            // Ledger errors: 4
            Self::Ledger(_) => 4,
            // Network errors: 5
            Self::Network(_) => 5,
            // Crypto errors: 6
            Self::Crypto(_) => 6,
            // Operations errors: 8
            Self::Ops(_) => 8,
            // IO errors: 9
            Self::Io(_) => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(NodeError::config("bad").exit_code(), 3);
        assert_eq!(NodeError::AlreadyExists(PathBuf::from("sedge.toml")).exit_code(), 1);
        assert_eq!(
            NodeError::from(sedge_crypto::CryptoError::NotSeeded).exit_code(),
            6
        );
        assert_eq!(
            NodeError::from(std::io::Error::other("disk")).exit_code(),
            9
        );
    }

    #[test]
    fn test_error_display() {
        let err = NodeError::AlreadyExists(PathBuf::from("keys/consumer.pem"));
        assert_eq!(
            err.to_string(),
            "keys/consumer.pem already exists. Pass --force to overwrite."
        );

        let err = NodeError::KeyFile {
            path: PathBuf::from("missing.pem"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("Cannot read key file missing.pem"));
    }

    #[test]
    fn test_toml_error_is_config_class() {
        let err: NodeError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert_eq!(err.exit_code(), 3);
    }
}
