//! Data models for mdnotes

mod note;

pub use note::{note_title, Note, NoteId};
