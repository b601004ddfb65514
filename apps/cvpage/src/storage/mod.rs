//! Profile storage: a single entry holding the JSON-serialized profile.
//!
//! There is no versioning or merging: `save` overwrites the entry, `clear`
//! removes it. `AppState` carries an `Arc<dyn ProfileStore>` so the file
//! backend can be swapped for the in-memory one in tests.

pub mod loader;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::profile::Profile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Profile>, StoreError>;

    async fn save(&self, profile: &Profile) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// Stores the profile as one JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Profile>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        debug!("Read stored profile from {}", self.path.display());
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_vec_pretty(profile)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.io_err(e))?;
        info!("Saved profile to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Cleared stored profile at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// Keeps the serialized entry in memory. Round-trips through JSON like the
/// file store so both behave the same.
#[derive(Default)]
pub struct MemoryStore {
    entry: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_profile(profile: &Profile) -> Result<Self, StoreError> {
        Ok(Self {
            entry: RwLock::new(Some(serde_json::to_string(profile)?)),
        })
    }

    /// Raw stored JSON, if any.
    pub async fn raw(&self) -> Option<String> {
        self.entry.read().await.clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load(&self) -> Result<Option<Profile>, StoreError> {
        match self.entry.read().await.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        let json = serde_json::to_string(profile)?;
        *self.entry.write().await = Some(json);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.entry.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::ContactItem;

    fn sample() -> Profile {
        Profile {
            name: "Ann".into(),
            contact: vec![ContactItem::new("email.png", "ann@example.com")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_file_store_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("userData.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/userData.json"));
        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_file_store_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("userData.json"));
        store.save(&sample()).await.unwrap();
        let replacement = Profile {
            title: "Only title".into(),
            ..Default::default()
        };
        store.save(&replacement).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("userData.json"));
        store.save(&sample()).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_entry_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("userData.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(path);
        assert!(matches!(store.load().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample()));
        assert!(store.raw().await.unwrap().contains("\"socialMedia\""));
        store.clear().await.unwrap();
        assert!(store.raw().await.is_none());
    }
}
