//! Persistence for the usage counter
//!
//! The limiter only needs two string keys, so the collaborator is a plain
//! key-value store. Backends:
//! - `MemoryStore`: in-process map
//! - `FileStore`: one JSON object on disk, replaced atomically on write

use court_core::StorageError;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// String key-value store holding the usage state between sessions
pub trait UsageStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several keys together. Backends that can should apply all or none.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<T: UsageStore + ?Sized> UsageStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        (**self).set_many(entries)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl UsageStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// JSON file store (`{"petty_court_count": "2", ...}`)
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory (`~/.local/share/petty-court/usage.json`)
    pub fn in_data_dir() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or_else(|| {
            StorageError::Unavailable("could not determine the data directory".to_string())
        })?;
        Ok(Self::new(dir.join("petty-court").join("usage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::Unavailable(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Unavailable(format!("corrupt store {}: {}", self.path.display(), e))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |e: std::io::Error| {
            StorageError::Unavailable(format!("failed to write {}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let data = serde_json::to_vec_pretty(values)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl UsageStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    /// One read-modify-write of the whole file, so the keys land together
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("discarding unreadable usage store: {}", e);
                BTreeMap::new()
            }
        };
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        self.write_all(&values)
    }
}
