//! Session store adapters
//!
//! - `JsonFileStore`: flat JSON object in `session.json`, written atomically
//!   (temp file + rename) while holding an exclusive lock on a sidecar file.
//! - `MemoryStore`: process-local map for tests and embedding.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStore;

/// File name of the session store inside the data directory
pub const SESSION_FILE: &str = "session.json";

/// Session store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    /// Store at `<dir>/session.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the exclusive lock; released when the returned file is dropped
    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("Failed to lock {:?}: {}", self.lock_path, e)))?;
        Ok(file)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            // A corrupt file is treated as empty and replaced on the next write
            Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_default()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::storage(format!("Failed to read {:?}: {}", self.path, e))),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| Error::storage(format!("Failed to write {:?}: {}", self.path, e.error)))?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock()?;
        Ok(self.read_entries()?.remove(key))
    }

    fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<()> {
        let _guard = self.lock()?;
        let mut entries = self.read_entries()?;
        for (key, value) in changes {
            match value {
                Some(v) => {
                    entries.insert(key.to_string(), v.to_string());
                }
                None => {
                    entries.remove(*key);
                }
            }
        }
        self.write_entries(&entries)
    }
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with entries
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Copy of all entries
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in changes {
            match value {
                Some(v) => {
                    entries.insert(key.to_string(), v.to_string());
                }
                None => {
                    entries.remove(*key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert_eq!(store.get("connectedAccount").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store
            .apply(&[("connectedAccount", Some("0xABC")), ("userDisconnected", Some("false"))])
            .unwrap();

        let reopened = JsonFileStore::in_dir(dir.path());
        assert_eq!(reopened.get("connectedAccount").unwrap().as_deref(), Some("0xABC"));
        assert_eq!(reopened.get("userDisconnected").unwrap().as_deref(), Some("false"));

        reopened.remove("connectedAccount").unwrap();
        assert_eq!(store.get("connectedAccount").unwrap(), None);
        assert_eq!(store.get("userDisconnected").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_file_store_replaces_corrupt_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.get("userDisconnected").unwrap(), None);
        store.set("userDisconnected", "true").unwrap();
        assert_eq!(store.get("userDisconnected").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_file_store_writes_flat_json() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store.set("userDisconnected", "true").unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, serde_json::json!({ "userDisconnected": "true" }));
    }

    #[test]
    fn test_memory_store_batch() {
        let store = MemoryStore::with_entries([("connectedAccount", "0xABC")]);
        store
            .apply(&[("connectedAccount", None), ("userDisconnected", Some("true"))])
            .unwrap();
        let entries = store.entries();
        assert!(!entries.contains_key("connectedAccount"));
        assert_eq!(entries.get("userDisconnected").map(String::as_str), Some("true"));
    }
}
