//! Storage configuration.
//!
//! The storage mode is a persisted preference read once when the hosting
//! process starts. It is handed to [`crate::StorageManager`] as an explicit
//! [`StorageConfig`] value; changing it takes effect on the next start.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::util::normalize_text_option;

/// Key holding the serialized note collection in the key-value store
pub const NOTES_KEY: &str = "markdown-notes";

/// Key holding the storage-mode preference
pub const MODE_KEY: &str = "storageMode";

/// Record-store database file name inside the data directory
pub const DB_FILE_NAME: &str = "notes.db";

/// Largest value the key-value store accepts (5 MiB)
pub const KV_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Which backend persists the notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Whole collection as one JSON blob in the key-value store
    #[default]
    Simple,
    /// One record per note in the libSQL record store
    Indexed,
}

impl StorageMode {
    /// Canonical name of the mode
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Indexed => "indexed",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" | "localstorage" => Ok(Self::Simple),
            "indexed" | "indexeddb" => Ok(Self::Indexed),
            other => Err(Error::InvalidInput(format!(
                "unknown storage mode '{other}' (expected 'simple' or 'indexed')"
            ))),
        }
    }
}

/// Where notes live and which backend writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding the key-value files and the database
    pub data_dir: PathBuf,
    /// Selected backend, fixed for the lifetime of a manager
    pub mode: StorageMode,
}

impl StorageConfig {
    /// Build a configuration with an explicit mode
    pub fn new(data_dir: impl Into<PathBuf>, mode: StorageMode) -> Self {
        Self {
            data_dir: data_dir.into(),
            mode,
        }
    }

    /// Build a configuration from the preference persisted in `data_dir`.
    ///
    /// A missing, unreadable or unknown preference selects [`StorageMode::Simple`].
    pub fn load(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let mode = read_mode_preference(&KeyValueStore::new(&data_dir));
        Self { data_dir, mode }
    }

    /// Persist `mode` as the preference for the next start
    pub fn persist_mode(data_dir: impl AsRef<Path>, mode: StorageMode) -> Result<()> {
        KeyValueStore::new(data_dir.as_ref()).set(MODE_KEY, mode.as_str())
    }

    /// Key-value store rooted at the data directory
    pub fn key_value_store(&self) -> KeyValueStore {
        KeyValueStore::new(&self.data_dir)
    }

    /// Path of the record-store database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn read_mode_preference(store: &KeyValueStore) -> StorageMode {
    let raw = match store.get(MODE_KEY) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!("Failed to read storage mode preference: {}", error);
            None
        }
    };

    let Some(raw) = normalize_text_option(raw) else {
        return StorageMode::default();
    };

    raw.parse().unwrap_or_else(|error| {
        tracing::warn!("Ignoring storage mode preference: {}", error);
        StorageMode::default()
    })
}
