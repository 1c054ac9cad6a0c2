//! Protocol constants shared by the producer and consumer nodes.
//!
//! Sizes mirror the buffers the deployed devices were provisioned with;
//! timings are the defaults the config layer starts from.

// =============================================================================
// Sizes
// =============================================================================

/// Number of consumer slots remembered by the producer.
pub const AUTH_TABLE_CAPACITY: usize = 3;

/// Capacity of a single exchange payload in bytes.
pub const EXCHANGE_PAYLOAD_CAPACITY: usize = 256;

/// Ciphertext size produced for a 1024-bit consumer key.
pub const CIPHERTEXT_SIZE: usize = 128;

/// Maximum length of a PEM-encoded consumer public key.
pub const MAX_PUBLIC_KEY_PEM_LEN: usize = 274;

/// Length of an account address including the `0x` prefix.
pub const ACCOUNT_ADDRESS_LEN: usize = 42;

/// Length of a transaction hash including the `0x` prefix.
pub const TX_HASH_LEN: usize = 66;

/// Digest size of the data hash committed to the ledger.
pub const HASH_SIZE: usize = 32;

/// Maximum size of an encoded ledger JSON-RPC request.
pub const LEDGER_REQUEST_CAPACITY: usize = 2048;

// =============================================================================
// Timing
// =============================================================================

/// Bounded wait for a ledger response (seconds).
pub const LEDGER_RESPONSE_TIMEOUT_SECS: u64 = 10;

/// Receipt polls before a transaction is abandoned.
pub const CONFIRMATION_ATTEMPTS: u32 = 5;

/// Interval between receipt polls (seconds).
pub const CONFIRMATION_INTERVAL_SECS: u64 = 5;

/// Producer wait when pushing ciphertext into the exchange channel (seconds).
pub const PUSH_TIMEOUT_SECS: u64 = 2;

/// Coordinator wait when draining ciphertext for a data request (seconds).
pub const SERVE_DRAIN_TIMEOUT_SECS: u64 = 20;

/// Consumer pipeline wait per drain attempt (seconds).
pub const CONSUMER_DRAIN_TIMEOUT_SECS: u64 = 5;

/// Sleep between state checks while the producer pipeline idles (milliseconds).
pub const IDLE_INTERVAL_MS: u64 = 1000;

// =============================================================================
// Exchange
// =============================================================================

/// Decrypted readings at or above this value switch the indicator high.
pub const DEFAULT_INDICATOR_THRESHOLD: u8 = 5;

/// Payload sent when a request carries no body.
pub const DEFAULT_REQUEST_PAYLOAD: &[u8] = b"CAFFE";
