//! Balance acquisition.
//!
//! The balance mapping is produced outside this crate (ledger snapshots,
//! address-format conversion). [`BalanceSource`] is the seam; [`SnapshotFile`]
//! reads an already converted snapshot from disk.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{hex_encode, parse_address};
use crate::error::{DistributorError, Result};

/// Mapping `address -> amount` in a stable iteration order.
pub type BalanceMap = IndexMap<String, Amount>;

/// A non-negative token amount.
///
/// Written as a native integer when it fits a signed 64-bit value (TOML
/// integers are `i64`), otherwise as a decimal string. Reads also accept
/// `0x`-prefixed hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawAmount", into = "RawAmount")]
pub struct Amount(pub u128);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Text(String),
}

impl TryFrom<RawAmount> for Amount {
    type Error = DistributorError;

    fn try_from(raw: RawAmount) -> Result<Self> {
        match raw {
            RawAmount::Int(value) => u128::try_from(value)
                .map(Amount)
                .map_err(|_| DistributorError::InvalidAmount(format!("negative amount {value}"))),
            RawAmount::Text(text) => text.parse(),
        }
    }
}

impl From<Amount> for RawAmount {
    fn from(amount: Amount) -> Self {
        match i64::try_from(amount.0) {
            Ok(value) => RawAmount::Int(value),
            Err(_) => RawAmount::Text(amount.0.to_string()),
        }
    }
}

impl std::str::FromStr for Amount {
    type Err = DistributorError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x") {
            Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
            None => trimmed.parse::<u128>(),
        };
        parsed
            .map(Amount)
            .map_err(|e| DistributorError::InvalidAmount(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(value)
    }
}

/// Produces the balance mapping consumed by distribution building.
pub trait BalanceSource {
    fn load_balances(&self) -> Result<BalanceMap>;
}

/// A TOML snapshot of `"0x<address>" = amount` entries, read in file order.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BalanceSource for SnapshotFile {
    fn load_balances(&self) -> Result<BalanceMap> {
        let content = std::fs::read_to_string(&self.path)?;
        let raw: BalanceMap = toml::from_str(&content).map_err(|e| {
            DistributorError::Serialize(format!("failed to parse {:?}: {}", self.path, e))
        })?;
        let balances = normalize(raw)?;
        info!(
            "Loaded {} balances from {:?}",
            balances.len(),
            self.path
        );
        Ok(balances)
    }
}

/// Rewrites every key as a canonical lowercase `0x` address, keeping order.
///
/// Two keys naming the same address are rejected instead of merged.
pub fn normalize(raw: BalanceMap) -> Result<BalanceMap> {
    let mut balances = BalanceMap::with_capacity(raw.len());
    for (key, amount) in raw {
        let canonical = hex_encode(parse_address(&key)?);
        if balances.insert(canonical.clone(), amount).is_some() {
            return Err(DistributorError::Encoding(format!(
                "duplicate entry for {canonical}"
            )));
        }
    }
    Ok(balances)
}
