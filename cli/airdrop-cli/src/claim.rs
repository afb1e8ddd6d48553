use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use airdrop_cli::{
    hex_encode, parse_address, verify_proof, write_file_atomic, DistributionDocument,
};

#[derive(Parser, Debug)]
#[command(name = "claim")]
#[command(about = "Extract one recipient's airdrop claim", long_about = None)]
pub struct Cli {
    /// Distribution document (JSON) produced by build-tree
    #[arg(short, long)]
    distribution: PathBuf,

    /// Recipient address, with or without 0x prefix
    #[arg(short, long)]
    address: String,

    /// Output JSON file (prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ClaimOutput {
    merkle_root: String,
    address: String,
    index: u64,
    amount: String,
    leaf_hash: String,
    merkle_proof: Vec<String>,
}

pub fn run(args: &Cli) -> Result<()> {
    let distribution = DistributionDocument::read_json(&args.distribution)
        .context("Failed to read distribution document")?;

    let output = build_claim(&distribution, &args.address)?;
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize claim")?;

    match &args.output {
        Some(path) => {
            write_file_atomic(path, &json).context("Failed to write claim file")?;
            println!("Claim for {} written to {:?}", output.address, path);
            println!("Proof length: {} nodes", output.merkle_proof.len());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Look up `address` and check its proof before handing it out.
fn build_claim(distribution: &DistributionDocument, address: &str) -> Result<ClaimOutput> {
    let address = hex_encode(parse_address(address).context("Invalid recipient address")?);
    let claim = distribution
        .claims
        .get(&address)
        .with_context(|| format!("Address {} is not part of this distribution", address))?;

    let record = claim.record(&address).context("Malformed claim")?;
    let proof = claim.proof_hashes().context("Malformed proof")?;
    let root = distribution.root().context("Malformed Merkle root")?;
    let leaf = record.leaf_hash();
    if !verify_proof(&proof, &leaf, &root) {
        anyhow::bail!(
            "Proof for {} does not reproduce root {}",
            address,
            distribution.merkle_root
        );
    }

    Ok(ClaimOutput {
        merkle_root: distribution.merkle_root.clone(),
        address,
        index: claim.index,
        amount: claim.amount.clone(),
        leaf_hash: hex_encode(leaf),
        merkle_proof: claim.proof.clone(),
    })
}
