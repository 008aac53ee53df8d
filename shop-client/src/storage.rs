//! Key-value storage
//!
//! Backing store for the session (tokens, user) and the cart. Values are
//! strings, typically JSON. [`FileStorage`] keeps one file per key;
//! [`MemoryStorage`] is for tests and ephemeral sessions.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Async string key-value store
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> ClientResult<()>;
}

/// Read and decode a JSON value
pub async fn load_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> ClientResult<Option<T>> {
    match storage.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ClientError::storage(format!("corrupt value for '{key}': {e}"))),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub async fn save_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> ClientResult<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| ClientError::storage(format!("cannot encode '{key}': {e}")))?;
    storage.set(key, &raw).await
}

// ============================================================================
// FileStorage
// ============================================================================

/// One `{key}.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ClientResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(ClientError::storage(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        // write-then-rename so a crash never leaves a half-written value
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// MemoryStorage
// ============================================================================

/// In-process storage, lost on drop
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_storage_roundtrip_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested"));

        assert!(storage.get("auth_token").await.unwrap().is_none());
        storage.set("auth_token", "abc").await.unwrap();
        assert_eq!(storage.get("auth_token").await.unwrap().as_deref(), Some("abc"));

        storage.remove("auth_token").await.unwrap();
        storage.remove("auth_token").await.unwrap();
        assert!(storage.get("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        assert!(storage.set("../escape", "x").await.is_err());
        assert!(storage.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let storage = MemoryStorage::new();
        save_json(&storage, "numbers", &vec![1, 2, 3]).await.unwrap();
        let loaded: Option<Vec<i32>> = load_json(&storage, "numbers").await.unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        storage.set("numbers", "not json").await.unwrap();
        let err = load_json::<Vec<i32>>(&storage, "numbers").await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Storage);
    }
}
