//! Key-value persistence slots.
//!
//! The [`Storage`] trait is the only thing the history store knows about
//! persistence: read a string under a key, replace the string under a key.
//! Two backends ship with the crate:
//!
//! - [`FileStorage`] keeps one `<key>.json` file per key in a directory and
//!   replaces it atomically (write to a temp file, then rename).
//! - [`MemoryStorage`] keeps values in a map, for tests and embedding.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};

/// A string-valued key-value slot store.
pub trait Storage: Send + Sync {
    /// Read the value under `key`. `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key` in full.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Directory-backed storage, one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "storage slot written");
        Ok(())
    }
}

/// In-memory storage for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot, e.g. with a legacy or corrupt payload.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .slots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: Storage + ?Sized> Storage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
