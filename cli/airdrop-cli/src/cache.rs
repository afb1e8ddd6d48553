//! Write-once cache for pipeline stage outputs.
//!
//! Each entry is a file under the cache directory named by its key. An entry
//! is written once, atomically, after its computation succeeds and is only
//! read afterwards. Serialization is chosen explicitly through a [`Codec`].

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::common::write_file_atomic;
use crate::error::{DistributorError, Result};

/// Text serialization used for one cache entry.
pub trait Codec {
    fn name(&self) -> &'static str;

    fn encode<T: Serialize>(&self, value: &T) -> Result<String>;

    fn decode<T: DeserializeOwned>(&self, text: &str) -> std::result::Result<T, String>;
}

/// Pretty-printed JSON with two-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| DistributorError::Serialize(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> std::result::Result<T, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

impl Codec for TomlCodec {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        toml::to_string(value).map_err(|e| DistributorError::Serialize(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> std::result::Result<T, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key).is_file()
    }

    /// Read an entry if present. A present entry that fails to decode is an
    /// error, never a miss.
    pub fn load<T, C>(&self, key: &str, codec: &C) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        C: Codec,
    {
        let path = self.entry_path(key);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        codec
            .decode(&text)
            .map(Some)
            .map_err(|reason| DistributorError::CacheCorruption { path, reason })
    }

    pub fn store<T, C>(&self, key: &str, codec: &C, value: &T) -> Result<()>
    where
        T: Serialize,
        C: Codec,
    {
        let path = self.entry_path(key);
        let text = codec.encode(value)?;
        write_file_atomic(&path, &text)?;
        info!("Wrote {} cache entry {:?}", codec.name(), path);
        Ok(())
    }

    /// Return the entry at `key`, running `compute` only when it is absent.
    ///
    /// A failed computation leaves no entry behind.
    pub fn cached<T, C, F>(&self, key: &str, codec: &C, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        C: Codec,
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.load(key, codec)? {
            info!("Loaded {:?} from cache", self.entry_path(key));
            return Ok(value);
        }
        let value = compute()?;
        self.store(key, codec, &value)?;
        Ok(value)
    }
}
