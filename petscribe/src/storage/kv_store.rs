//! Key-value persistence
//!
//! The app keeps each document as one string under a fixed key. The file
//! store writes one `{key}.json` per key, using a temp file and rename so
//! readers never see a half-written document.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// String documents stored under string keys
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored under `key`, or `None` if there is none
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid storage key: {:?}", key)))
    }
}

/// File-backed key-value store
#[derive(Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the store directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Key-value store initialized at: {:?}", self.root);
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::debug!("Read {} ({} bytes)", key, content.len());
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageRead(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let write_err = |e: std::io::Error| {
            AppError::StorageWrite(format!("Failed to write {:?}: {}", path, e))
        };

        fs::create_dir_all(&self.root).await.map_err(write_err)?;

        // Write to temp file first (atomic write)
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(write_err)?;
        file.write_all(value.as_bytes()).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        fs::rename(&temp_path, &path).await.map_err(write_err)?;

        tracing::debug!("Wrote {} ({} bytes)", key, value.len());

        Ok(())
    }
}

/// In-memory key-value store
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileKeyValueStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("store"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let (store, _temp) = create_test_store().await;
        assert_eq!(store.get("pets").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (store, _temp) = create_test_store().await;

        store.set("pets", "[]").await.unwrap();
        store.set("pets", r#"[{"id":"1"}]"#).await.unwrap();

        assert_eq!(
            store.get("pets").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let (store, temp) = create_test_store().await;
        store.set("pets", "[]").await.unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(temp.path().join("store")).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        assert_eq!(names, vec!["pets.json".to_string()]);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let (store, _temp) = create_test_store().await;

        assert!(matches!(
            store.set("../escape", "x").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(store.get("").await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("pets").await.unwrap(), None);

        store.set("pets", "[]").await.unwrap();
        let clone = store.clone();
        assert_eq!(clone.get("pets").await.unwrap().as_deref(), Some("[]"));
    }
}
