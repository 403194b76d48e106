//! Synchronous key-value backend: the whole collection as one JSON blob

use crate::error::Result;
use crate::models::Note;

use super::kv::KeyValueStore;
use super::NoteBackend;

/// Stores every note as a single JSON array under one fixed key.
#[derive(Debug, Clone)]
pub struct SimpleBackend {
    store: KeyValueStore,
    key: String,
}

impl SimpleBackend {
    /// Create a backend writing to `key` inside `store`
    pub fn new(store: KeyValueStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the collection; an absent key is an empty collection
    pub fn read(&self) -> Result<Vec<Note>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Serialize and overwrite the whole collection
    pub fn write(&self, notes: &[Note]) -> Result<()> {
        let raw = serde_json::to_string(notes)?;
        self.store.set(&self.key, &raw)
    }

    /// Remove the stored collection
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

impl NoteBackend for SimpleBackend {
    async fn load(&self) -> Result<Vec<Note>> {
        self.read()
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        self.write(notes)
    }
}
