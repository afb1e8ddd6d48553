//! Two-stage, cached distribution pipeline.
//!
//! Stage A acquires balances from a [`BalanceSource`]; stage B turns them
//! into a [`DistributionDocument`]. Each stage's output is memoized in the
//! [`CacheStore`] under its own key with its own [`Codec`], so rerunning the
//! pipeline never recomputes a stage whose entry already exists.

use tracing::info;

use crate::balances::{BalanceMap, BalanceSource};
use crate::cache::{CacheStore, Codec, JsonCodec, TomlCodec};
use crate::config::DistributorConfig;
use crate::distribution::{build_distribution, DistributionDocument};
use crate::error::Result;

/// Where and how one stage's output is cached.
#[derive(Debug, Clone)]
pub struct Stage<C> {
    pub key: String,
    pub codec: C,
}

impl<C: Codec> Stage<C> {
    pub fn new(key: impl Into<String>, codec: C) -> Self {
        Self {
            key: key.into(),
            codec,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline<A = TomlCodec, B = JsonCodec> {
    store: CacheStore,
    balances: Stage<A>,
    distribution: Stage<B>,
}

impl Pipeline {
    /// Balances cached as TOML, the distribution as JSON.
    pub fn from_config(config: &DistributorConfig) -> Self {
        Self::new(
            CacheStore::new(&config.cache.dir),
            Stage::new(&config.cache.balances_key, TomlCodec),
            Stage::new(&config.cache.distribution_key, JsonCodec),
        )
    }
}

impl<A: Codec, B: Codec> Pipeline<A, B> {
    pub fn new(store: CacheStore, balances: Stage<A>, distribution: Stage<B>) -> Self {
        Self {
            store,
            balances,
            distribution,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Stage A: acquire balances, or reuse the cached mapping.
    pub fn balances<S>(&self, source: &S) -> Result<BalanceMap>
    where
        S: BalanceSource + ?Sized,
    {
        self.store
            .cached(&self.balances.key, &self.balances.codec, || {
                source.load_balances()
            })
    }

    /// Stage B: build the distribution document, or reuse the cached one.
    pub fn distribution(&self, balances: &BalanceMap) -> Result<DistributionDocument> {
        self.store
            .cached(&self.distribution.key, &self.distribution.codec, || {
                build_distribution(balances)
            })
    }

    pub fn run<S>(&self, source: &S) -> Result<DistributionDocument>
    where
        S: BalanceSource + ?Sized,
    {
        let balances = self.balances(source)?;
        let document = self.distribution(&balances)?;
        info!(
            "Distribution ready: root {} total {} ({} claims)",
            document.merkle_root,
            document.token_total,
            document.claims.len()
        );
        Ok(document)
    }
}
