//! Shared fixtures: keys, addresses and quick-timing configs.

use sedge_crypto::{generate_keypair, CryptoOps, KeyPair, PrivateKeyPem, DEFAULT_KEY_BITS};
use sedge_ledger::{LedgerClient, LedgerConfig, RetryConfig};
use sedge_ops::ExchangeConfig;
use sedge_types::{AccountAddress, TxHash};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::mock_ledger::MockLedger;

/// Entropy used to seed test `CryptoOps`.
pub const TEST_ENTROPY: &[u8] = b"sedge-test-entropy";

/// A consumer key pair, generated once per test binary.
pub fn consumer_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| generate_keypair(DEFAULT_KEY_BITS).unwrap())
}

/// A second, unrelated key pair.
pub fn other_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| generate_keypair(DEFAULT_KEY_BITS).unwrap())
}

/// Seeded crypto without a private key, as used by producers.
pub fn producer_crypto() -> Arc<CryptoOps> {
    let crypto = CryptoOps::new(None);
    crypto.seed(TEST_ENTROPY).unwrap();
    Arc::new(crypto)
}

/// Seeded crypto holding `private_pem`.
pub fn crypto_with_key(private_pem: &PrivateKeyPem) -> Arc<CryptoOps> {
    let crypto = CryptoOps::new(Some(private_pem.clone()));
    crypto.seed(TEST_ENTROPY).unwrap();
    Arc::new(crypto)
}

/// Seeded crypto holding the consumer fixture's private key.
pub fn consumer_crypto() -> Arc<CryptoOps> {
    crypto_with_key(&consumer_keypair().private_pem)
}

/// The producer's account.
pub fn producer_address() -> AccountAddress {
    AccountAddress::parse("0x1111111111111111111111111111111111111111").unwrap()
}

/// The consumer's account.
pub fn consumer_address() -> AccountAddress {
    AccountAddress::parse("0x2222222222222222222222222222222222222222").unwrap()
}

/// The exchange contract.
pub fn contract_address() -> AccountAddress {
    AccountAddress::parse("0x3333333333333333333333333333333333333333").unwrap()
}

/// A transaction hash ending in `n`.
pub fn tx_hash(n: u64) -> TxHash {
    TxHash::parse(&format!("0x{:064x}", n)).unwrap()
}

/// An address for transports that ignore it.
pub fn loopback_peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5683))
}

/// Ledger config with short waits: 1s responses, 5 confirmation polls 100ms apart.
pub fn fast_ledger_config() -> LedgerConfig {
    LedgerConfig::default()
        .with_response_timeout(Duration::from_secs(1))
        .with_confirmation(RetryConfig::fixed(5, Duration::from_millis(100)))
}

/// Exchange config with short waits.
pub fn fast_exchange_config() -> ExchangeConfig {
    ExchangeConfig::default()
        .with_push_timeout(Duration::from_millis(200))
        .with_serve_drain_timeout(Duration::from_millis(500))
        .with_consumer_drain_timeout(Duration::from_millis(500))
        .with_idle_interval(Duration::from_millis(20))
}

/// A client talking to `ledger` with [`fast_ledger_config`].
pub fn ledger_client(ledger: &MockLedger) -> Arc<LedgerClient> {
    Arc::new(LedgerClient::new(
        Arc::new(ledger.clone()),
        &fast_ledger_config(),
    ))
}
