// Copyright 2025 Cowboy AI, LLC.

//! Durable local key-value storage
//!
//! The portal keeps two well-known keys here: the in-progress draft and the
//! offline submitted-report list. Values are whole JSON documents; every
//! write replaces the previous value.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

/// Errors from durable local storage
#[derive(Debug, Clone, Error)]
pub enum LocalStoreError {
    /// Underlying storage read or write failed
    #[error("Storage error for key {key}: {message}")]
    Storage {
        /// Key the operation addressed
        key: String,
        /// What went wrong
        message: String,
    },
}

/// Durable string key-value storage
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Remove the value stored under `key`
    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}

/// File-backed storage, one file per key
///
/// The directory is created on first write. Keys map directly to file names,
/// so only well-known filename-safe keys belong here.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the stored values
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        match fs::read_to_string(self.file_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LocalStoreError::Storage {
                key: key.to_string(),
                message: err.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| LocalStoreError::Storage {
            key: key.to_string(),
            message: err.to_string(),
        })?;

        fs::write(self.file_path(key), value).map_err(|err| LocalStoreError::Storage {
            key: key.to_string(),
            message: err.to_string(),
        })?;

        debug!(key, "Stored local value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(LocalStoreError::Storage {
                key: key.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

/// In-memory storage for tests and demos
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_in_memory_storage_round_trip() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get("draft").unwrap(), None);

        storage.set("draft", "{\"a\":1}").unwrap();
        assert_eq!(storage.get("draft").unwrap(), Some("{\"a\":1}".to_string()));

        storage.set("draft", "{\"a\":2}").unwrap();
        assert_eq!(storage.get("draft").unwrap(), Some("{\"a\":2}".to_string()));

        storage.remove("draft").unwrap();
        assert_eq!(storage.get("draft").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_a_no_op() {
        let storage = InMemoryStorage::new();
        storage.remove("never-stored").unwrap();
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("dept-report-store-{}", Uuid::new_v4()));
        let storage = FileStorage::new(&dir);

        assert_eq!(storage.get("demo-reports").unwrap(), None);

        storage.set("demo-reports", "[]").unwrap();
        assert_eq!(storage.get("demo-reports").unwrap(), Some("[]".to_string()));

        storage.set("demo-reports", "[{\"id\":\"csdept\"}]").unwrap();
        assert_eq!(
            storage.get("demo-reports").unwrap(),
            Some("[{\"id\":\"csdept\"}]".to_string())
        );

        storage.remove("demo-reports").unwrap();
        assert_eq!(storage.get("demo-reports").unwrap(), None);

        fs::remove_dir_all(&dir).unwrap();
    }
}
