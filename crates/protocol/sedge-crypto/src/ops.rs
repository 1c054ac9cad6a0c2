//! Node-level cryptographic operations.
//!
//! [`CryptoOps`] owns the node's private key and a seeded random
//! generator. The generator must be seeded exactly once, from a
//! device-specific entropy sample, before anything is encrypted or
//! decrypted.

use std::sync::{Mutex, OnceLock};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Encrypt;
use sha2::{Digest, Sha256};
use tracing::debug;

use sedge_types::ConsumerEntry;

use crate::error::{CryptoError, CryptoResult};
use crate::hash::{data_hash, data_hash_into};
use crate::keys::{parse_private_key, parse_public_key, PrivateKeyPem};
use crate::Hash;

/// Personalization mixed into the generator seed.
const SEED_PERSONALIZATION: &[u8] = b"sedge-ctr-drbg";

/// PKCS#1 v1.5 overhead in bytes.
const PKCS1_OVERHEAD: usize = 11;

/// Hash, encrypt-for-consumer and decrypt-own operations.
pub struct CryptoOps {
    own_key: Option<PrivateKeyPem>,
    rng: OnceLock<Mutex<StdRng>>,
}

impl CryptoOps {
    /// Create an unseeded instance.
    ///
    /// `own_key` is only required by nodes that decrypt (consumers).
    pub fn new(own_key: Option<PrivateKeyPem>) -> Self {
        Self {
            own_key,
            rng: OnceLock::new(),
        }
    }

    /// Seed the random generator from a device entropy sample.
    ///
    /// The sample is mixed with OS randomness and a personalization
    /// string. Fails with [`CryptoError::AlreadySeeded`] on a second call.
    pub fn seed(&self, entropy: &[u8]) -> CryptoResult<()> {
        let mut os_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut os_bytes);

        let mut hasher = Sha256::new();
        hasher.update(SEED_PERSONALIZATION);
        hasher.update(entropy);
        hasher.update(os_bytes);
        let seed: [u8; 32] = hasher.finalize().into();

        self.rng
            .set(Mutex::new(StdRng::from_seed(seed)))
            .map_err(|_| CryptoError::AlreadySeeded)?;
        debug!(entropy_len = entropy.len(), "Random generator seeded");
        Ok(())
    }

    /// Whether [`seed`](Self::seed) has run.
    pub fn is_seeded(&self) -> bool {
        self.rng.get().is_some()
    }

    /// Hash `data`.
    pub fn hash(&self, data: &[u8]) -> CryptoResult<Hash> {
        data_hash(data)
    }

    /// Hash `data` into a caller-provided digest buffer.
    pub fn hash_into(&self, data: &[u8], out: &mut [u8]) -> CryptoResult<()> {
        data_hash_into(data, out)
    }

    /// Encrypt `plaintext` for the active consumer.
    ///
    /// `active` is the snapshot of the consumer table's active entry; `None`
    /// or an inactive entry fails with [`CryptoError::KeyParse`]. The
    /// ciphertext is always the key modulus size (128 bytes for 1024-bit keys).
    pub fn encrypt_for(
        &self,
        active: Option<&ConsumerEntry>,
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let entry = active
            .filter(|entry| entry.active)
            .ok_or_else(|| CryptoError::key_parse("no active consumer entry"))?;
        let rng = self.rng.get().ok_or(CryptoError::NotSeeded)?;

        let key = parse_public_key(&entry.public_key_pem)?;
        let max_plaintext = key.size().saturating_sub(PKCS1_OVERHEAD);
        if plaintext.len() > max_plaintext {
            return Err(CryptoError::encrypt(format!(
                "plaintext is {} bytes, key allows {}",
                plaintext.len(),
                max_plaintext
            )));
        }

        let mut rng = rng
            .lock()
            .map_err(|_| CryptoError::encrypt("random generator lock poisoned"))?;
        let ciphertext = key
            .encrypt(&mut *rng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| CryptoError::encrypt(e.to_string()))?;

        debug!(
            consumer = %entry.address,
            ciphertext_len = ciphertext.len(),
            "Encrypted for consumer"
        );
        Ok(ciphertext)
    }

    /// Decrypt `ciphertext` with this node's private key.
    pub fn decrypt_own(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let rng = self.rng.get().ok_or(CryptoError::NotSeeded)?;
        let pem = self
            .own_key
            .as_ref()
            .ok_or_else(|| CryptoError::key_parse("no private key configured"))?;
        let key = parse_private_key(pem)?;

        let mut rng = rng
            .lock()
            .map_err(|_| CryptoError::decrypt("random generator lock poisoned"))?;
        key.decrypt_blinded(&mut *rng, Pkcs1v15Encrypt, ciphertext)
            .map_err(|e| CryptoError::decrypt(e.to_string()))
    }
}

impl std::fmt::Debug for CryptoOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoOps")
            .field("has_own_key", &self.own_key.is_some())
            .field("seeded", &self.is_seeded())
            .finish()
    }
}
