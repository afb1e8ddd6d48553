use std::fs;

use airdrop_cli::{
    pair_hash, parse_address, verify_proof, DistributionDocument, DistributorConfig,
    DistributorError, MerkleTree, Pipeline, Record, SnapshotFile,
};
use tempfile::TempDir;

const ADDR_A: &str = "0x00000000000000000000000000000000000000a1";
const ADDR_B: &str = "0x00000000000000000000000000000000000000b2";

fn setup(snapshot: &str) -> (TempDir, DistributorConfig) {
    let dir = TempDir::new().unwrap();
    let balances = dir.path().join("snapshot").join("00-bytes.toml");
    fs::create_dir_all(balances.parent().unwrap()).unwrap();
    fs::write(&balances, snapshot).unwrap();

    let mut config = DistributorConfig::default();
    config.input.balances = balances;
    config.cache.dir = dir.path().join("snapshot_secret");
    (dir, config)
}

fn run(config: &DistributorConfig) -> airdrop_cli::Result<DistributionDocument> {
    Pipeline::from_config(config).run(&SnapshotFile::new(&config.input.balances))
}

#[test]
fn test_two_recipient_distribution() {
    let (_dir, config) = setup(&format!("\"{ADDR_A}\" = 100\n\"{ADDR_B}\" = 200\n"));
    let doc = run(&config).unwrap();

    let ha = Record::new(0, parse_address(ADDR_A).unwrap(), 100).leaf_hash();
    let hb = Record::new(1, parse_address(ADDR_B).unwrap(), 200).leaf_hash();
    let root = pair_hash(&ha, &hb);

    assert_eq!(doc.root().unwrap(), root);
    assert_eq!(doc.token_total, "0x12c");
    assert_eq!(doc.claims[ADDR_A].proof_hashes().unwrap(), vec![hb]);
    assert_eq!(doc.claims[ADDR_B].proof_hashes().unwrap(), vec![ha]);
    assert!(verify_proof(&[hb], &ha, &root));
    assert!(verify_proof(&[ha], &hb, &root));
}

#[test]
fn test_rerun_is_byte_identical_and_skips_input() {
    let (_dir, config) = setup(&format!("\"{ADDR_A}\" = 1\n\"{ADDR_B}\" = 2\n"));
    let first = run(&config).unwrap();
    let entry = config.cache.dir.join(&config.cache.distribution_key);
    let bytes = fs::read(&entry).unwrap();

    // With both entries cached the snapshot is never read again.
    fs::remove_file(&config.input.balances).unwrap();
    let second = run(&config).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read(&entry).unwrap(), bytes);
    assert_eq!(DistributionDocument::read_json(&entry).unwrap(), first);
}

#[test]
fn test_large_distribution_verifies() {
    let snapshot: String = (1..=57u32)
        .map(|i| format!("\"0x{:040x}\" = {}\n", i, u64::from(i) * 1_000_000_007))
        .collect();
    let (_dir, config) = setup(&snapshot);
    let doc = run(&config).unwrap();

    let report = doc.audit().unwrap();
    assert!(report.is_ok(), "{report:?}");
    assert_eq!(report.claims, 57);

    let records: Vec<Record> = doc
        .claims
        .iter()
        .map(|(address, claim)| claim.record(address).unwrap())
        .collect();
    let tree = MerkleTree::from_records(&records).unwrap();
    assert_eq!(doc.root().unwrap(), tree.root());
}

#[test]
fn test_corrupt_distribution_entry_is_fatal() {
    let (_dir, config) = setup(&format!("\"{ADDR_A}\" = 1\n"));
    fs::create_dir_all(&config.cache.dir).unwrap();
    let entry = config.cache.dir.join(&config.cache.distribution_key);
    fs::write(&entry, "{\"merkleRoot\": 5}").unwrap();

    let result = run(&config);
    assert!(matches!(
        result,
        Err(DistributorError::CacheCorruption { .. })
    ));
    assert_eq!(fs::read_to_string(&entry).unwrap(), "{\"merkleRoot\": 5}");
}

#[test]
fn test_invalid_address_in_snapshot() {
    let (_dir, config) = setup("\"0x1234\" = 1\n");
    let result = run(&config);
    assert!(matches!(result, Err(DistributorError::Encoding(_))));
    assert!(!config.cache.dir.join(&config.cache.balances_key).exists());
}
