//! Pipeline collaborators: sensor, indicator and payload crypto.

use sedge_crypto::{CryptoOps, CryptoResult, Hash};
use sedge_types::{ConsumerEntry, IndicatorLevel};

/// Source of readings and seeding entropy.
pub trait Sensor: Send + Sync {
    /// Latest averaged reading.
    ///
    /// May block briefly while the driver collects its sample window.
    fn sample_averaged(&self) -> u8;

    /// Device-specific noise used once to seed the random generator.
    fn entropy_sample(&self) -> u32;
}

/// Output that reflects the last verified reading.
pub trait Indicator: Send + Sync {
    /// Switch the output.
    fn set_level(&self, level: IndicatorLevel);
}

/// Encryption and hashing as the producer pipeline uses them.
///
/// Implemented by [`CryptoOps`].
pub trait PayloadCrypto: Send + Sync {
    /// Encrypt `plaintext` for the active consumer entry.
    fn encrypt_for(&self, active: Option<&ConsumerEntry>, plaintext: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Hash the ciphertext that will be committed.
    fn hash(&self, data: &[u8]) -> CryptoResult<Hash>;
}

impl PayloadCrypto for CryptoOps {
    fn encrypt_for(&self, active: Option<&ConsumerEntry>, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        CryptoOps::encrypt_for(self, active, plaintext)
    }

    fn hash(&self, data: &[u8]) -> CryptoResult<Hash> {
        CryptoOps::hash(self, data)
    }
}
