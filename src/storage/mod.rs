//! Durable preference storage
//!
//! The site keeps two values across reloads: the last active locale and a
//! flag marking that the visitor picked it by hand. This module abstracts the
//! key-value store they live in so the same code runs against a JSON file, an
//! in-process map, or a store that is switched off entirely.
//!
//! # Keys
//!
//! - [`LOCALE_KEY`] (`i18nextLng`): locale tag, `"en"` or `"id"`
//! - [`MANUAL_KEY`] (`i18nextLng-manual`): `"true"` when present

pub mod file;

use std::collections::HashMap;
use std::sync::RwLock;

pub use file::FileStore;

/// Storage key holding the last active locale tag
pub const LOCALE_KEY: &str = "i18nextLng";

/// Storage key holding the manual-override sentinel
pub const MANUAL_KEY: &str = "i18nextLng-manual";

/// Sentinel value written under [`MANUAL_KEY`]
pub const MANUAL_SENTINEL: &str = "true";

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing preferences
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled or not available in this environment
    #[error("Preference storage is unavailable")]
    Unavailable,

    /// Underlying I/O failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be decoded or encoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Key-value store for visitor preferences
///
/// Implementations must be safe to share between the engine and the
/// refinement task.
pub trait PreferenceStore: Send + Sync {
    /// Get the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// In-process preference store
///
/// Used for tests and for sessions that should not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Copy of every stored entry
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Store standing in for blocked or missing storage
///
/// Reads find nothing and writes fail with [`StorageError::Unavailable`],
/// so every load re-derives the locale from the remaining signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStore;

impl PreferenceStore for DisabledStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
