use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use airdrop_cli::{write_file_atomic, Codec, DistributorConfig, JsonCodec, Pipeline, SnapshotFile};

#[derive(Parser, Debug)]
#[command(name = "build-tree")]
#[command(about = "Build the Merkle distribution from a balance snapshot", long_about = None)]
pub struct Cli {
    /// Balance snapshot ("0x<address>" = amount), overrides [input].balances
    #[arg(short, long)]
    balances: Option<PathBuf>,

    /// Cache directory, overrides [cache].dir
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Also write the distribution document here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: Cli, mut config: DistributorConfig) -> Result<()> {
    if let Some(balances) = args.balances {
        config.input.balances = balances;
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache.dir = cache_dir;
    }
    config.validate().context("Invalid configuration")?;

    let pipeline = Pipeline::from_config(&config);
    let source = SnapshotFile::new(&config.input.balances);

    info!("Building distribution from {:?}...", source.path());
    let distribution = pipeline
        .run(&source)
        .context("Failed to build distribution")?;

    println!("Merkle root: {}", distribution.merkle_root);
    println!("Token total: {}", distribution.token_total);
    println!("Claims: {}", distribution.claims.len());

    if let Some(output) = args.output {
        let json = JsonCodec
            .encode(&distribution)
            .context("Failed to serialize distribution")?;
        write_file_atomic(&output, &json).context("Failed to write distribution file")?;
        println!("Wrote distribution to {:?}", output);
    }

    Ok(())
}
