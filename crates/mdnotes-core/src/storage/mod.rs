//! Storage backends and the manager that selects between them

mod indexed;
mod kv;
mod manager;
mod memory;
mod simple;

pub use indexed::IndexedBackend;
pub use kv::KeyValueStore;
pub use manager::{SaveOutcome, StorageManager};
pub use memory::MemoryBackend;
pub use simple::SimpleBackend;

use crate::error::Result;
use crate::models::Note;

/// The load/save contract every backend implements.
///
/// Both operations work on the whole collection. Backends report failures;
/// [`StorageManager`] is the layer that turns them into empty loads and
/// skipped saves.
#[allow(async_fn_in_trait)]
pub trait NoteBackend {
    /// Load the full collection in stored order
    async fn load(&self) -> Result<Vec<Note>>;

    /// Replace the full collection
    async fn save(&self, notes: &[Note]) -> Result<()>;
}
