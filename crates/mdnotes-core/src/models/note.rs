//! Note model

use std::fmt;

use chrono::{DateTime, Duration, Local, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque, never-reused note identifier.
///
/// Freshly created notes get a UUID v7 string (time-sortable). Identifiers read
/// back from storage are kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for NoteId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NoteId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, immutable
    pub id: NoteId,
    /// Title derived from the creation time, never updated afterwards
    pub title: String,
    /// Markdown source
    pub content: String,
    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last committed content change
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note with the given content, stamped with the current time
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self::new_at(content, Utc::now())
    }

    /// Create a new note as if it had been created at `now`
    #[must_use]
    pub fn new_at(content: impl Into<String>, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(3);
        Self {
            id: NoteId::new(),
            title: note_title(&now.with_timezone(&Local)),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy carrying `content` and a fresh `updated_at`.
    ///
    /// `updated_at` always moves forward by at least one millisecond, even when
    /// the wall clock has not.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        let floor = self.updated_at + Duration::milliseconds(1);
        Self {
            content: content.into(),
            updated_at: Utc::now().trunc_subsecs(3).max(floor),
            ..self.clone()
        }
    }
}

/// Build the creation-time title, e.g. `Note Oct 19, 2026 03:45 PM`.
pub fn note_title<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!("Note {}", at.format("%b %-d, %Y %I:%M %p"))
}
