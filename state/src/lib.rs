//! Persistent page state for the start page: a small JSON-file-backed
//! key-value store plus the models saved in it. The input layer never talks
//! to this crate directly; only the command dispatcher and the search
//! handler do.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

pub mod history;
pub mod page;

pub use page::Background;
pub use page::BackgroundKind;
pub use page::BoardItem;
pub use page::PAGE_STATE_KEY;
pub use page::PageState;

/// Key-value store persisted as a single JSON object on disk.
///
/// Writes go through a temp file plus rename so a crash mid-write never
/// leaves a truncated store behind.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value. A missing file or key yields `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let map = self.read_map().await?;
        match map.get(key) {
            Some(value) => {
                let value = serde_json::from_value(value.clone())
                    .with_context(|| format!("malformed value under key `{key}`"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_map(&map).await
    }

    /// Drop every stored key.
    pub async fn clear(&self) -> anyhow::Result<()> {
        self.write_map(&Map::new()).await
    }

    async fn read_map(&self) -> anyhow::Result<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        let map = serde_json::from_slice(&bytes)
            .with_context(|| format!("malformed state file {}", self.path.display()))?;
        Ok(map)
    }

    async fn write_map(&self, map: &Map<String, Value>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to move state into {}", self.path.display()))?;
        Ok(())
    }
}
