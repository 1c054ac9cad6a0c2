//! Data structures for the sedge ledger-anchored data exchange.
//!
//! A producer device encrypts sensor readings for a consumer's public key,
//! commits the ciphertext hash to a ledger contract, and serves the
//! ciphertext on request. This crate holds the shared vocabulary of that
//! exchange and no behavior beyond validation.
//!
//! # Module Organization
//!
//! - [`constants`] - Buffer sizes, timing defaults and exchange literals
//! - [`address`] - Account addresses and transaction hashes
//! - [`ledger`] - Ledger call kinds and receipt status
//! - [`exchange`] - Exchange payloads and consumer entries
//! - [`state`] - Producer state, consumer step and indicator level
//! - [`error`] - Validation errors
//! - [`duration_millis`] - Serde helper for millisecond durations
//!
//! # Type Conventions
//!
//! - Bounded values (`ExchangePayload`, `ConsumerEntry`, `AccountAddress`)
//!   can only be built through checked constructors
//! - Enums with wire values use `#[repr(u8)]`
//! - Serde uses `snake_case` for enum variants

/// Protocol version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod address;
pub mod constants;
pub mod duration_millis;
pub mod error;
pub mod exchange;
pub mod ledger;
pub mod state;

pub use address::{AccountAddress, TxHash};
pub use constants::*;
pub use error::{TypesError, TypesResult};
pub use exchange::{ConsumerEntry, ExchangePayload};
pub use ledger::{ConfirmationStatus, LedgerCallKind};
pub use state::{ExchangeStep, IndicatorLevel, ProducerState};
