//! Merkle airdrop distribution.
//!
//! Turns a balance mapping into a Merkle root to publish on-chain and a
//! per-recipient inclusion proof to hand out off-chain. Stage outputs are
//! memoized on disk so repeated runs are idempotent.

pub mod balances;
pub mod cache;
pub mod common;
pub mod config;
pub mod distribution;
pub mod error;
pub mod leaf;
pub mod logging;
pub mod merkle;
pub mod pipeline;

pub use balances::{Amount, BalanceMap, BalanceSource, SnapshotFile};
pub use cache::{CacheStore, Codec, JsonCodec, TomlCodec};
pub use common::{
    hex_encode, keccak256, pair_hash, parse_address, parse_hash, write_file_atomic, Address,
    Hash,
};
pub use config::DistributorConfig;
pub use distribution::{build_distribution, AuditReport, Claim, DistributionDocument};
pub use error::{DistributorError, Result};
pub use leaf::Record;
pub use merkle::{verify_proof, MerkleTree};
pub use pipeline::{Pipeline, Stage};
