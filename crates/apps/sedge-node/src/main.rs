//! Sedge node binary entry point.

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sedge_node::{
    cli::{Cli, Commands},
    commands,
    config::{default_config_path, NodeConfig},
    error::{NodeError, NodeResult},
    signals::shutdown_signal,
};

fn main() {
    // Parse CLI arguments BEFORE creating tokio runtime
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let e = NodeError::from(e);
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    };

    match rt.block_on(run(cli)) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Install the fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for the sedge
/// crates with `--verbose`.
fn init_logging(verbose: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    if verbose {
        for krate in [
            "sedge_node",
            "sedge_ops",
            "sedge_ledger",
            "sedge_net",
            "sedge_crypto",
        ] {
            if let Ok(directive) = format!("{}=debug", krate).parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn print_error(e: &NodeError) {
    eprintln!("Error: {}", e);
}

async fn run(cli: Cli) -> NodeResult<String> {
    let config_path = cli.config.unwrap_or_else(default_config_path);

    // Dispatch command
    match cli.command {
        Commands::Init { force } => commands::init(&config_path, force),
        Commands::Keygen { force } => {
            let config = NodeConfig::load(&config_path)?;
            commands::keygen(&config.keys, force)
        }
        Commands::Producer => {
            let config = NodeConfig::load(&config_path)?;
            commands::producer(config, shutdown_signal()).await
        }
        Commands::Consumer => {
            let config = NodeConfig::load(&config_path)?;
            commands::consumer(config, shutdown_signal()).await
        }
    }
}
