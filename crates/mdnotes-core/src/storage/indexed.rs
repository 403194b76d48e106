//! Asynchronous record-store backend on top of libSQL

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::db::{Database, LibSqlNoteRepository, NoteRepository};
use crate::error::Result;
use crate::models::Note;

use super::NoteBackend;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// One record per note in a versioned database, replaced wholesale on save.
///
/// The database is opened lazily on first use. A failed open is not
/// remembered, so the next call tries again.
pub struct IndexedBackend {
    location: Location,
    db: Mutex<Option<Database>>,
}

impl IndexedBackend {
    /// Back the store with a database file at `path`
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            db: Mutex::new(None),
        }
    }

    /// Back the store with a private in-memory database (primarily for tests)
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            db: Mutex::new(None),
        }
    }

    async fn open(&self) -> Result<Database> {
        match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Database::open(path).await
            }
            Location::Memory => Database::open_in_memory().await,
        }
    }

    async fn ensure_open<'a>(&self, slot: &'a mut Option<Database>) -> Result<&'a Database> {
        let db = match slot.take() {
            Some(db) => db,
            None => self.open().await?,
        };
        Ok(slot.insert(db))
    }
}

impl NoteBackend for IndexedBackend {
    async fn load(&self) -> Result<Vec<Note>> {
        let mut slot = self.db.lock().await;
        let db = self.ensure_open(&mut slot).await?;
        LibSqlNoteRepository::new(db.connection()).list_all().await
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        let mut slot = self.db.lock().await;
        let db = self.ensure_open(&mut slot).await?;
        LibSqlNoteRepository::new(db.connection())
            .replace_all(notes)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fresh_store_loads_empty() {
        let backend = IndexedBackend::in_memory();
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_replaces_records() {
        let backend = IndexedBackend::in_memory();

        backend.save(&[Note::new("a"), Note::new("b")]).await.unwrap();
        let notes = vec![Note::new("c")];
        backend.save(&notes).await.unwrap();

        assert_eq!(backend.load().await.unwrap(), notes);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_file_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("data").join("notes.db");
        let notes = vec![Note::new("newest"), Note::new("older")];

        IndexedBackend::open_path(&path).save(&notes).await.unwrap();
        let reopened = IndexedBackend::open_path(&path);

        assert_eq!(reopened.load().await.unwrap(), notes);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_newer_schema_fails_to_open() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notes.db");
        {
            let db = Database::open(&path).await.unwrap();
            db.connection()
                .execute("INSERT INTO schema_version (version) VALUES (2)", ())
                .await
                .unwrap();
        }

        let error = IndexedBackend::open_path(&path).load().await.unwrap_err();
        assert!(matches!(error, Error::VersionConflict { found: 2, .. }));
    }
}
