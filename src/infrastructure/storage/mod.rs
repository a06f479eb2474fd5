//! Key-value storage implementations

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::errors::StorageError;
use crate::domain::traits::KeyValueStore;

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    kv: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn kv(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.kv.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.kv().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.kv().remove(key);
        Ok(())
    }
}

/// JSON file-based store.
///
/// Every key lives in one JSON object on disk, the way a browser keeps its
/// `localStorage` for an origin. The file is rewritten whole on each change.
pub struct JsonFileStore {
    path: PathBuf,
    kv: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, reading existing entries if the file is there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let kv = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %path.display(), entries = kv.len(), "Opened JSON file store");

        Ok(Self {
            path,
            kv: Mutex::new(kv),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn kv(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.kv.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, kv: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(kv)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut kv = self.kv();
        let previous = kv.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&kv) {
            // keep memory and disk in agreement
            match previous {
                Some(old) => kv.insert(key.to_string(), old),
                None => kv.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut kv = self.kv();
        if let Some(old) = kv.remove(key) {
            if let Err(e) = self.flush(&kv) {
                kv.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }
}
