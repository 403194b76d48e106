//! mdnotes-core - Core library for mdnotes
//!
//! This crate contains the note model, the interchangeable storage backends,
//! the storage manager, the debounced autosave engine ([`NoteStore`]) and the
//! editor/preview scroll synchronizer used by every mdnotes front end.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod render;
pub mod scroll;
pub mod storage;
pub mod store;
mod util;

pub use config::{StorageConfig, StorageMode};
pub use error::{Error, Result};
pub use models::{Note, NoteId};
pub use storage::{SaveOutcome, StorageManager};
pub use store::{NoteStore, SaveHandle, StoreState, AUTOSAVE_DEBOUNCE};
