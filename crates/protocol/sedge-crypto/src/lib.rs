//! Cryptographic primitives for sedge nodes.
//!
//! - **Data hashing**: SHA-256 over the exact ciphertext, committed to the ledger
//! - **Consumer encryption**: RSA PKCS#1 v1.5 with the consumer's published key
//! - **Own decryption**: RSA with the node's private key, blinded by the seeded generator
//! - **Key material**: PEM parsing and key pair generation
//!
//! # Example
//!
//! ```
//! use sedge_crypto::{generate_keypair, CryptoOps, DEFAULT_KEY_BITS};
//! use sedge_types::{AccountAddress, ConsumerEntry};
//!
//! let pair = generate_keypair(DEFAULT_KEY_BITS).unwrap();
//! let ops = CryptoOps::new(Some(pair.private_pem.clone()));
//! ops.seed(b"device entropy").unwrap();
//!
//! let address = AccountAddress::parse("0x1111111111111111111111111111111111111111").unwrap();
//! let consumer = ConsumerEntry::new(address, pair.public_pem).unwrap().activated();
//!
//! let ciphertext = ops.encrypt_for(Some(&consumer), &[7]).unwrap();
//! assert_eq!(ciphertext.len(), 128);
//! assert_eq!(ops.decrypt_own(&ciphertext).unwrap(), vec![7]);
//! ```

mod error;
mod hash;
mod keys;
mod ops;

pub use error::{CryptoError, CryptoResult};
pub use hash::{data_hash, data_hash_into};
pub use keys::{
    generate_keypair, parse_private_key, parse_public_key, KeyPair, PrivateKeyPem,
    DEFAULT_KEY_BITS,
};
pub use ops::CryptoOps;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Create a Hash from a slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::hash(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(array))
    }

    /// Get the raw bytes of the hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash({})", hex_string(&self.0[..8]))
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Helper function to convert bytes to hex string (for Debug output).
fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        + "..."
}
