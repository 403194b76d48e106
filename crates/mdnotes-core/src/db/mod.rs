//! Database layer backing the record-store storage mode

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use migrations::CURRENT_VERSION;
pub use repository::{LibSqlNoteRepository, NoteRepository};
