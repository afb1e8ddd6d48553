#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use airdrop_cli::{logging, DistributorConfig};

mod build_tree;
mod claim;
mod verify;

#[derive(Parser, Debug)]
#[command(name = "airdrop")]
#[command(about = "Merkle airdrop distribution tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build (or reuse) the cached distribution document
    BuildTree(build_tree::Cli),
    /// Extract and check one recipient's claim
    Claim(claim::Cli),
    /// Check every claim in a distribution document
    Verify(verify::Cli),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DistributorConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    logging::try_init(config.logging.level.with_verbosity(cli.verbose))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(args, config)?,
        Commands::Claim(args) => claim::run(&args)?,
        Commands::Verify(args) => verify::run(&args)?,
    }

    Ok(())
}
