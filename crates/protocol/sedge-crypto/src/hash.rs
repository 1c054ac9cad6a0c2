//! Ciphertext hashing.
//!
//! The producer commits `SHA-256(ciphertext)` to the ledger and the consumer
//! recomputes it over the bytes it received, so both sides must hash the
//! exact payload with no framing or domain prefix.

use sha2::{Digest, Sha256};

use sedge_types::HASH_SIZE;

use crate::error::{CryptoError, CryptoResult};
use crate::Hash;

/// Compute the data hash of `data`.
///
/// # Example
/// ```
/// use sedge_crypto::data_hash;
///
/// let hash = data_hash(b"ciphertext").unwrap();
/// assert_eq!(hash.0.len(), 32);
/// ```
pub fn data_hash(data: &[u8]) -> CryptoResult<Hash> {
    Ok(Hash(Sha256::digest(data).into()))
}

/// Compute the data hash of `data` into `out`.
///
/// `out` must be exactly [`HASH_SIZE`] bytes; it is left untouched on error.
pub fn data_hash_into(data: &[u8], out: &mut [u8]) -> CryptoResult<()> {
    if out.len() != HASH_SIZE {
        return Err(CryptoError::hash(format!(
            "destination is {} bytes, digest is {}",
            out.len(),
            HASH_SIZE
        )));
    }
    let hash = data_hash(data)?;
    out.copy_from_slice(&hash.0);
    Ok(())
}
