//! Exchange operations for sedge nodes.
//!
//! This crate wires the lower layers into the two roles of the exchange:
//!
//! - **Producer**: [`ProducerPipeline`] prepares ciphertext for the active
//!   consumer and commits its hash to the ledger; [`ExchangeCoordinator`]
//!   answers consumer requests and hands the ciphertext out.
//! - **Consumer**: [`ConsumerClient`] walks the request sequence against a
//!   producer; [`ConsumerPipeline`] verifies what it receives and votes.
//!
//! The two producer components share a [`ProducerContext`]. Only the
//! pipeline holds the [`ProducerStateWriter`]; the coordinator sees the
//! state through a [`ProducerStateView`].
//!
//! ```text
//!        consumer                          producer
//!  ┌────────────────────┐          ┌─────────────────────────┐
//!  │ ConsumerClient     │ ──req──▶ │ ExchangeCoordinator     │
//!  │   ↓ try_push       │ ◀──rsp── │   ↑ drain               │
//!  │ ExchangeChannel    │          │ ExchangeChannel         │
//!  │   ↓ drain          │          │   ↑ push                │
//!  │ ConsumerPipeline   │          │ ProducerPipeline        │
//!  └─────────┬──────────┘          └────────────┬────────────┘
//!            └───────────── LedgerClient ───────┘
//! ```

mod auth_table;
mod channel;
mod client;
mod config;
mod consumer;
mod context;
mod coordinator;
mod error;
mod producer;
mod sensor;

pub use auth_table::AuthTable;
pub use channel::ExchangeChannel;
pub use client::ConsumerClient;
pub use config::ExchangeConfig;
pub use consumer::{ConsumerPipeline, ConsumerSession, Verification};
pub use context::{ConsumerAuthFlag, ProducerContext, ProducerStateView, ProducerStateWriter};
pub use coordinator::ExchangeCoordinator;
pub use error::{OpsError, OpsResult};
pub use producer::{ProducerAccounts, ProducerPipeline, ProducerRun};
pub use sensor::{Indicator, PayloadCrypto, Sensor};
