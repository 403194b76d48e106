//! Directory-backed key-value store
//!
//! Each key is one `<key>.json` file. Writes go to a sibling temporary file
//! that is renamed over the target, so readers never observe a torn value.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::KV_QUOTA_BYTES;
use crate::error::{Error, Result};

/// Synchronous, size-limited string store keyed by name.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    dir: PathBuf,
    quota: usize,
}

impl KeyValueStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: KV_QUOTA_BYTES,
        }
    }

    /// Override the per-value size limit
    #[must_use]
    pub const fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Read the value stored under `key`, or `None` if absent
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if value.len() > self.quota {
            return Err(Error::QuotaExceeded {
                size: value.len(),
                limit: self.quota,
            });
        }

        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        if let Err(error) = fs::rename(&temp_path, &path) {
            fs::remove_file(&temp_path).ok();
            return Err(error.into());
        }
        Ok(())
    }

    /// Remove the value stored under `key`; absent keys are not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(Error::InvalidInput(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_missing_key() {
        let tmp = tempdir().unwrap();
        let store = KeyValueStore::new(tmp.path());
        assert_eq!(store.get("markdown-notes").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let tmp = tempdir().unwrap();
        let store = KeyValueStore::new(tmp.path().join("nested"));

        store.set("storageMode", "indexed").unwrap();
        assert_eq!(store.get("storageMode").unwrap().as_deref(), Some("indexed"));

        store.set("storageMode", "simple").unwrap();
        assert_eq!(store.get("storageMode").unwrap().as_deref(), Some("simple"));
        assert!(!tmp.path().join("nested/storageMode.json.tmp").exists());
    }

    #[test]
    fn test_remove() {
        let tmp = tempdir().unwrap();
        let store = KeyValueStore::new(tmp.path());

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_quota_refuses_large_values() {
        let tmp = tempdir().unwrap();
        let store = KeyValueStore::new(tmp.path()).with_quota(4);

        store.set("k", "tiny").unwrap();
        let error = store.set("k", "too large").unwrap_err();
        assert!(matches!(error, Error::QuotaExceeded { size: 9, limit: 4 }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("tiny"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let tmp = tempdir().unwrap();
        let store = KeyValueStore::new(tmp.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(store.get(key), Err(Error::InvalidInput(_))), "{key}");
        }
    }
}
