// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client-local storage for the usage record
//!
//! Stores hold the record as an opaque string under one well-known key, the
//! way browser local storage would. Parsing and policy live in the tracker.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Well-known storage key for the usage record
pub const USAGE_STORAGE_KEY: &str = "sprite_generator_usage";

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw read/write access to the stored record
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Stored value, or `None` if nothing was ever written
    async fn read(&self) -> Result<Option<String>, UsageError>;

    /// Replace the stored value
    async fn write(&self, value: &str) -> Result<(), UsageError>;
}

/// In-process store for tests and ephemeral clients
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    value: RwLock<Option<String>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: RwLock::new(Some(value.to_string())),
        }
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn read(&self) -> Result<Option<String>, UsageError> {
        Ok(self.value.read().await.clone())
    }

    async fn write(&self, value: &str) -> Result<(), UsageError> {
        *self.value.write().await = Some(value.to_string());
        Ok(())
    }
}

/// JSON key/value file standing in for browser local storage.
///
/// Concurrent writers are not coordinated; the last write wins.
pub struct FileUsageStore {
    path: PathBuf,
    key: String,
}

impl FileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: USAGE_STORAGE_KEY.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_entries(&self) -> Result<BTreeMap<String, String>, UsageError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl UsageStore for FileUsageStore {
    async fn read(&self) -> Result<Option<String>, UsageError> {
        Ok(self.load_entries().await?.remove(&self.key))
    }

    async fn write(&self, value: &str) -> Result<(), UsageError> {
        // A corrupt file is replaced rather than blocking the write
        let mut entries = self.load_entries().await.unwrap_or_default();
        entries.insert(self.key.clone(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&entries)?).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
