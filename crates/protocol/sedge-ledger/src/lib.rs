//! Ledger access for sedge nodes.
//!
//! Both nodes talk to the same contract: the producer commits ciphertext
//! hashes and reads consumer keys, the consumer registers its key, reads
//! the committed hash and votes on the producer.
//!
//! # Architecture
//!
//! ```text
//! sedge-ops                      sedge-ledger
//! ┌──────────────────┐          ┌───────────────────────────────┐
//! │ ProducerPipeline │ ───────► │ LedgerClient                  │
//! │ ConsumerPipeline │          │   ├─ LedgerCodec (sedge-wire) │
//! │ ConsumerClient   │          │   ├─ RetryPolicy              │
//! └──────────────────┘          │   └─ LedgerTransport (trait)  │
//!                               │        └─ HttpLedgerTransport │
//!                               └───────────────┬───────────────┘
//!                                               │ ResponseHandle
//!                                               ▼
//!                               ┌───────────────────────────────┐
//!                               │ Ledger node (JSON-RPC)        │
//!                               └───────────────────────────────┘
//! ```
//!
//! Every wait is bounded: a call gives up after the response timeout and
//! confirmation polling gives up after its attempt bound.

mod client;
mod config;
mod error;
mod retry;
mod transport;

pub use client::LedgerClient;
pub use config::{Backoff, LedgerConfig, RetryConfig, DEFAULT_ENDPOINT, DEFAULT_POST_PATH};
pub use error::{LedgerError, LedgerResult};
pub use retry::RetryPolicy;
pub use transport::{HttpLedgerTransport, LedgerTransport, ResponseHandle, ResponseReceiver};
