//! Node binary for the sedge exchange.
//!
//! This crate provides the `sedge` binary, which runs one side of the
//! exchange against a ledger node:
//!
//! - **Producer**: serves the exchange protocol over TCP and runs the
//!   sample, encrypt, commit and hand-over pipeline
//! - **Consumer**: drives the request sequence against a producer and
//!   verifies each delivered reading against the ledger
//!
//! # Quick Start
//!
//! ```bash
//! # Write a default configuration file
//! sedge init
//!
//! # Generate the consumer key pair
//! sedge keygen
//!
//! # Run one side
//! sedge producer
//! sedge consumer
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from `sedge.toml` in the working directory.
//! Override with `--config`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod signals;

// Re-export main types
pub use cli::{Cli, Commands};
pub use config::NodeConfig;
pub use error::{NodeError, NodeResult};
