//! TOML configuration for the distribution pipeline.
//!
//! Loaded from `--config` when given, otherwise defaults apply.
//! CLI flags override config file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DistributorError, Result};
use crate::logging::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DistributorConfig {
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Snapshot of `"0x<address>" = amount` entries.
    pub balances: PathBuf,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            balances: "snapshot/00-bytes.toml".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub dir: PathBuf,
    /// Key of the balance-acquisition stage entry (TOML).
    pub balances_key: String,
    /// Key of the distribution stage entry (JSON).
    pub distribution_key: String,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: "snapshot_secret".into(),
            balances_key: "01-balances.toml".into(),
            distribution_key: "07-merkle-distribution.json".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: LogLevel,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
        }
    }
}

impl DistributorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: DistributorConfig = toml::from_str(&s)
            .map_err(|e| DistributorError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Both stages must have distinct, non-empty keys.
    pub fn validate(&self) -> Result<()> {
        let keys = [&self.cache.balances_key, &self.cache.distribution_key];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(DistributorError::Config("cache keys must not be empty".into()));
        }
        if self.cache.balances_key == self.cache.distribution_key {
            return Err(DistributorError::Config(format!(
                "balances and distribution share cache key {:?}",
                self.cache.balances_key
            )));
        }
        Ok(())
    }

    pub fn example_toml() -> &'static str {
        r#"# Airdrop distributor configuration
# All values shown are defaults.

[input]
balances = "snapshot/00-bytes.toml"  # "0x<address>" = amount, one per line

[cache]
dir = "snapshot_secret"
balances_key = "01-balances.toml"
distribution_key = "07-merkle-distribution.json"

[logging]
level = "info"  # trace | debug | info | warn | error
"#
    }
}
