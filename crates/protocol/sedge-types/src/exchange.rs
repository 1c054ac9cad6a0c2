//! Payloads and consumer records passed between nodes.

use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::constants::{EXCHANGE_PAYLOAD_CAPACITY, MAX_PUBLIC_KEY_PEM_LEN};
use crate::error::{TypesError, TypesResult};

/// Ciphertext carried through the exchange channel.
///
/// Never longer than [`EXCHANGE_PAYLOAD_CAPACITY`]; construction copies
/// only after the bound check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePayload {
    bytes: Vec<u8>,
}

impl ExchangePayload {
    /// Copy `bytes` into a new payload.
    pub fn new(bytes: &[u8]) -> TypesResult<Self> {
        Self::from_vec(bytes.to_vec())
    }

    /// Take ownership of `bytes` as a payload.
    pub fn from_vec(bytes: Vec<u8>) -> TypesResult<Self> {
        if bytes.len() > EXCHANGE_PAYLOAD_CAPACITY {
            return Err(TypesError::PayloadTooLarge {
                size: bytes.len(),
                max: EXCHANGE_PAYLOAD_CAPACITY,
            });
        }
        Ok(Self { bytes })
    }

    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in use.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume into the underlying buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for ExchangePayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A consumer known to the producer: who they are and how to encrypt for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerEntry {
    /// Lowercased ledger address.
    pub address: AccountAddress,
    /// PEM-encoded public key.
    pub public_key_pem: String,
    /// Whether this entry is the current encryption target.
    pub active: bool,
}

impl ConsumerEntry {
    /// Create an inactive entry after checking the key bound.
    pub fn new(address: AccountAddress, public_key_pem: impl Into<String>) -> TypesResult<Self> {
        let public_key_pem = public_key_pem.into();
        if public_key_pem.len() > MAX_PUBLIC_KEY_PEM_LEN {
            return Err(TypesError::PublicKeyTooLarge {
                size: public_key_pem.len(),
                max: MAX_PUBLIC_KEY_PEM_LEN,
            });
        }
        if !public_key_pem.trim_start().starts_with("-----BEGIN") {
            return Err(TypesError::InvalidPublicKey(
                "missing PEM header".to_string(),
            ));
        }
        Ok(Self {
            address,
            public_key_pem,
            active: false,
        })
    }

    /// Builder-style activation.
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }
}
