//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sedge exchange node.
#[derive(Parser, Debug)]
#[command(name = "sedge")]
#[command(author = "Sedge Contributors")]
#[command(version)]
#[command(about = "Ledger-anchored sensor data exchange node")]
#[command(
    long_about = "Sedge exchanges encrypted sensor readings between a producer and a consumer,\nanchoring each reading's hash on a ledger.\n\nRun 'sedge init' to get started."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "SEDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // =========================================================================
    // Setup Commands
    // =========================================================================
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// Generate the consumer's RSA key pair.
    ///
    /// Writes PEM files to the paths in the `[keys]` section.
    Keygen {
        /// Overwrite existing key files.
        #[arg(short, long)]
        force: bool,
    },

    // =========================================================================
    // Node Commands
    // =========================================================================
    /// Run the producer side until interrupted.
    Producer,

    /// Run the consumer side until interrupted.
    Consumer,
}
