//! JSON file preference store
//!
//! Preferences are kept as a single flat JSON object:
//!
//! ```json
//! {
//!   "i18nextLng": "id",
//!   "i18nextLng-manual": "true"
//! }
//! ```
//!
//! The file is created on first write. Writes go to a sibling temp file that
//! is then renamed over the original, so a crash never leaves half a document.
//! A document that no longer parses is replaced on the next write.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{PreferenceStore, StorageError, StorageResult};

/// Preference store backed by a JSON file on disk
#[derive(Debug)]
pub struct FileStore {
    /// Location of the JSON document
    path: PathBuf,

    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let mut entries = match self.load() {
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Preference file is corrupt, starting a fresh one"
                );
                BTreeMap::new()
            }
            other => other?,
        };
        if entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)?;

        tracing::trace!(path = %self.path.display(), key, value, "Preference written");
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LOCALE_KEY, MANUAL_KEY};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get(LOCALE_KEY).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = FileStore::new(&path);
        store.set(LOCALE_KEY, "id").unwrap();
        store.set(MANUAL_KEY, "true").unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(LOCALE_KEY).unwrap(), Some("id".to_string()));
        assert_eq!(reopened.get(MANUAL_KEY).unwrap(), Some("true".to_string()));
    }

    #[test]
    fn test_same_value_does_not_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let store = FileStore::new(&path);

        store.set(LOCALE_KEY, "en").unwrap();
        let before = fs::read(&path).unwrap();
        store.set(LOCALE_KEY, "en").unwrap();
        let after = fs::read(&path).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(LOCALE_KEY),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        store.set(LOCALE_KEY, "id").unwrap();
        store.set(MANUAL_KEY, "true").unwrap();

        assert_eq!(store.get(LOCALE_KEY).unwrap(), Some("id".to_string()));
        assert_eq!(store.get(MANUAL_KEY).unwrap(), Some("true".to_string()));
    }
}
