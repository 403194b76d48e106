//! Note repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite stores positions as i64

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};

use crate::error::{Error, Result};
use crate::models::{Note, NoteId};

/// Trait for whole-collection note storage (async)
///
/// The record store is always written as a complete snapshot; there are no
/// row-level updates.
#[allow(async_fn_in_trait)]
pub trait NoteRepository {
    /// Load every note, in stored list order
    async fn list_all(&self) -> Result<Vec<Note>>;

    /// Replace the whole record set with `notes`, atomically
    async fn replace_all(&self, notes: &[Note]) -> Result<()>;
}

/// libSQL implementation of `NoteRepository`
pub struct LibSqlNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlNoteRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a note from a database row
    fn parse_note(row: &libsql::Row) -> Result<Note> {
        let id: String = row.get(0)?;
        Ok(Note {
            id: NoteId::from(id),
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: parse_timestamp(&row.get::<String>(3)?)?,
            updated_at: parse_timestamp(&row.get::<String>(4)?)?,
        })
    }

    async fn insert_all(&self, notes: &[Note]) -> Result<()> {
        self.conn.execute("DELETE FROM notes", ()).await?;

        for (position, note) in notes.iter().enumerate() {
            self.conn
                .execute(
                    "INSERT INTO notes (id, title, content, created_at, updated_at, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        note.id.to_string(),
                        note.title.clone(),
                        note.content.clone(),
                        format_timestamp(&note.created_at),
                        format_timestamp(&note.updated_at),
                        position as i64
                    ],
                )
                .await?;
        }

        Ok(())
    }
}

impl NoteRepository for LibSqlNoteRepository<'_> {
    async fn list_all(&self) -> Result<Vec<Note>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, content, created_at, updated_at
                 FROM notes
                 ORDER BY position ASC, created_at DESC",
                (),
            )
            .await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            match Self::parse_note(&row) {
                Ok(note) => notes.push(note),
                Err(error) => tracing::warn!("Skipping unreadable note record: {}", error),
            }
        }

        Ok(notes)
    }

    async fn replace_all(&self, notes: &[Note]) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        if let Err(e) = self.insert_all(notes).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|error| Error::InvalidInput(format!("invalid timestamp '{raw}': {error}")))
}
