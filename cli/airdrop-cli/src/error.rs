use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistributorError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Cannot build a Merkle tree from an empty set of records")]
    EmptySet,

    #[error("Leaf not found in tree: {0}")]
    NotFound(String),

    #[error("Corrupt cache entry at {path:?}: {reason}")]
    CacheCorruption { path: PathBuf, reason: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DistributorError>;
