//! Light node CLI
//!
//! Runs the adaptive tree sampling scheduler against a CosmWasm tree
//! registry, a zero-knowledge prover and a proof submission endpoint.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lightnode")]
#[command(about = "Light node - samples remote Merkle trees and submits verified proofs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path; a missing file means defaults plus environment
    #[arg(short, long, global = true, default_value = "lightnode.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Run,
    /// Run exactly one cycle and print its outcome
    Cycle,
    /// Show the wallet address and compressed public key
    Wallet,
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run => {
            let config = commands::common::load_config(&cli.config)?;
            commands::run::run(&config).await?;
        }
        Commands::Cycle => {
            let config = commands::common::load_config(&cli.config)?;
            commands::cycle::run(&config).await?;
        }
        Commands::Wallet => {
            let config = commands::common::load_config_unvalidated(&cli.config)?;
            commands::wallet::show(&config)?;
        }
        Commands::Config => {
            let config = commands::common::load_config_unvalidated(&cli.config)?;
            commands::config::show(&config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lightnode", "cycle", "--verbose", "-c", "node.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("node.toml"));
        assert!(matches!(cli.command, Commands::Cycle));
    }
}
