//! Crypto wrapper with injectable faults.

use sedge_crypto::{CryptoError, CryptoOps, CryptoResult, Hash};
use sedge_ops::PayloadCrypto;
use sedge_types::{ConsumerEntry, EXCHANGE_PAYLOAD_CAPACITY};
use std::sync::Arc;

/// Which operation misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoFault {
    /// `hash` fails.
    Hash,
    /// `encrypt_for` returns more bytes than an exchange payload holds.
    OversizedCiphertext,
}

/// Delegates to real [`CryptoOps`] except for one faulty operation.
pub struct FaultyCrypto {
    inner: Arc<CryptoOps>,
    fault: CryptoFault,
}

impl FaultyCrypto {
    /// Wrap `inner` with `fault`.
    pub fn new(inner: Arc<CryptoOps>, fault: CryptoFault) -> Self {
        Self { inner, fault }
    }
}

impl PayloadCrypto for FaultyCrypto {
    fn encrypt_for(&self, active: Option<&ConsumerEntry>, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut ciphertext = self.inner.encrypt_for(active, plaintext)?;
        if self.fault == CryptoFault::OversizedCiphertext {
            ciphertext.resize(EXCHANGE_PAYLOAD_CAPACITY + 1, 0);
        }
        Ok(ciphertext)
    }

    fn hash(&self, data: &[u8]) -> CryptoResult<Hash> {
        match self.fault {
            CryptoFault::Hash => Err(CryptoError::hash("injected hash failure")),
            CryptoFault::OversizedCiphertext => self.inner.hash(data),
        }
    }
}
