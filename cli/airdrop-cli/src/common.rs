use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use sha3::{Digest, Keccak256};

use crate::error::{DistributorError, Result};

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Parses a 20-byte address from a hex string.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix
///
/// # Returns
/// A 20-byte array representing the address
///
/// # Errors
/// Returns an encoding error if the address is not 40 hex characters or
/// contains invalid hex
pub fn parse_address(addr_str: &str) -> Result<Address> {
    let trimmed = addr_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != 40 {
        return Err(DistributorError::Encoding(format!(
            "address must be 40 hex chars, got {} in {:?}",
            cleaned.len(),
            addr_str
        )));
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address)
        .map_err(|e| DistributorError::Encoding(format!("invalid address {addr_str:?}: {e}")))?;
    Ok(address)
}

/// Parses a 32-byte hash from a hex string, with or without "0x" prefix.
pub fn parse_hash(hash_str: &str) -> Result<Hash> {
    let trimmed = hash_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != 64 {
        return Err(DistributorError::Encoding(format!(
            "expected 64 hex chars for a hash, got {}",
            cleaned.len()
        )));
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| DistributorError::Encoding(format!("invalid hash hex: {e}")))?;
    Ok(hash)
}

/// Renders bytes as a lowercase "0x"-prefixed hex string.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Computes the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hashes two nodes after ordering them by raw byte value.
///
/// The result does not depend on argument order, so proofs carry no
/// left/right position bits.
pub fn pair_hash(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(first)
        .chain_update(second)
        .finalize()
        .into()
}

/// Writes `contents` to `path` through a temp file and a rename, so readers
/// never observe a partially written file.
pub fn write_file_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let mut file = File::create(temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    if let Err(e) = fs::rename(temp_path, path) {
        let _ = fs::remove_file(temp_path);
        return Err(e);
    }
    Ok(())
}
