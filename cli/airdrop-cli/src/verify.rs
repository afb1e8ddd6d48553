use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use airdrop_cli::DistributionDocument;

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(about = "Check every claim of a distribution document against its root", long_about = None)]
pub struct Cli {
    /// Distribution document (JSON) produced by build-tree
    #[arg(short, long)]
    distribution: PathBuf,
}

pub fn run(args: &Cli) -> Result<()> {
    let distribution = DistributionDocument::read_json(&args.distribution)
        .context("Failed to read distribution document")?;

    println!("Verifying {} claims...", distribution.claims.len());
    let report = distribution
        .audit()
        .context("Distribution document is malformed")?;

    for address in &report.invalid_proofs {
        warn!("Invalid proof for {}", address);
    }
    if !report.total_matches {
        warn!(
            "Token total {} does not match sum of claims {}",
            distribution.token_total, report.computed_total
        );
    }
    if !report.indices_contiguous {
        warn!("Claim indices are not contiguous from 0");
    }

    if !report.is_ok() {
        anyhow::bail!(
            "Verification failed: {} invalid proofs out of {}",
            report.invalid_proofs.len(),
            report.claims
        );
    }

    println!("All {} claims verify against {}", report.claims, distribution.merkle_root);
    Ok(())
}
