//! Storage manager: one backend, selected by mode, behind a non-failing contract

use std::time::Duration;

use crate::config::{StorageConfig, StorageMode, NOTES_KEY};
use crate::models::Note;

use super::{IndexedBackend, KeyValueStore, MemoryBackend, NoteBackend, SimpleBackend};

/// Whether a save reached the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
}

impl SaveOutcome {
    pub const fn is_saved(self) -> bool {
        matches!(self, Self::Saved)
    }
}

enum Backend {
    Simple(SimpleBackend),
    Indexed(IndexedBackend),
    Memory(MemoryBackend),
}

/// Uniform asynchronous load/save over the configured backend.
///
/// The mode is fixed for the manager's lifetime. Backend failures never
/// escape: loads fall back to an empty collection and saves report
/// [`SaveOutcome::Failed`], both after logging the cause.
pub struct StorageManager {
    mode: StorageMode,
    backend: Backend,
    // Synchronous snapshot source for asynchronous modes.
    cache: Option<SimpleBackend>,
}

impl StorageManager {
    /// Create the manager described by `config`
    pub fn new(config: &StorageConfig) -> Self {
        let simple = SimpleBackend::new(config.key_value_store(), NOTES_KEY);
        tracing::info!(
            "Using {} storage in {}",
            config.mode,
            config.data_dir.display()
        );

        match config.mode {
            StorageMode::Simple => Self {
                mode: StorageMode::Simple,
                backend: Backend::Simple(simple),
                cache: None,
            },
            StorageMode::Indexed => Self {
                mode: StorageMode::Indexed,
                backend: Backend::Indexed(IndexedBackend::open_path(config.database_path())),
                cache: Some(simple),
            },
        }
    }

    /// Record-store manager over a private in-memory database, with
    /// `cache_dir` as its snapshot cache
    pub fn indexed_in_memory(cache_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            mode: StorageMode::Indexed,
            backend: Backend::Indexed(IndexedBackend::in_memory()),
            cache: Some(SimpleBackend::new(KeyValueStore::new(cache_dir), NOTES_KEY)),
        }
    }

    /// Synchronous in-memory manager seeded with `notes`
    pub fn in_memory(notes: Vec<Note>) -> Self {
        Self {
            mode: StorageMode::Simple,
            backend: Backend::Memory(MemoryBackend::new(notes)),
            cache: None,
        }
    }

    /// In-memory manager whose loads take `latency`, behaving like an
    /// asynchronous backend with an empty snapshot cache
    pub fn in_memory_with_latency(notes: Vec<Note>, latency: Duration) -> Self {
        Self {
            mode: StorageMode::Indexed,
            backend: Backend::Memory(MemoryBackend::new(notes).with_latency(latency)),
            cache: None,
        }
    }

    /// Configured mode
    pub const fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Whether [`Self::snapshot`] already returns the authoritative collection
    pub const fn is_synchronous(&self) -> bool {
        match &self.backend {
            Backend::Simple(_) => true,
            Backend::Indexed(_) => false,
            Backend::Memory(memory) => memory.latency().is_none(),
        }
    }

    /// The in-memory backend, when this manager uses one
    pub const fn memory(&self) -> Option<&MemoryBackend> {
        match &self.backend {
            Backend::Memory(memory) => Some(memory),
            _ => None,
        }
    }

    const fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Simple(_) => "key-value store",
            Backend::Indexed(_) => "record store",
            Backend::Memory(_) => "memory",
        }
    }

    /// Best-effort collection available without suspending.
    ///
    /// For synchronous backends this is the real collection. Asynchronous
    /// backends answer from the key-value cache, or with nothing.
    pub fn snapshot(&self) -> Vec<Note> {
        let result = match (&self.backend, &self.cache) {
            (Backend::Simple(simple), _) => simple.read(),
            (Backend::Memory(memory), _) if memory.latency().is_none() => Ok(memory.notes()),
            (_, Some(cache)) => cache.read(),
            (_, None) => Ok(Vec::new()),
        };

        result.unwrap_or_else(|error| {
            tracing::error!("Failed to read notes snapshot: {}", error);
            Vec::new()
        })
    }

    /// Load the full collection; any failure yields an empty collection
    pub async fn load_notes(&self) -> Vec<Note> {
        let result = match &self.backend {
            Backend::Simple(simple) => simple.load().await,
            Backend::Indexed(indexed) => indexed.load().await,
            Backend::Memory(memory) => memory.load().await,
        };

        result.unwrap_or_else(|error| {
            tracing::error!(
                "Failed to load notes from {}: {}",
                self.backend_name(),
                error
            );
            Vec::new()
        })
    }

    /// Replace the full collection; failures are logged and reported
    pub async fn save_notes(&self, notes: &[Note]) -> SaveOutcome {
        let result = match &self.backend {
            Backend::Simple(simple) => simple.save(notes).await,
            Backend::Indexed(indexed) => indexed.save(notes).await,
            Backend::Memory(memory) => memory.save(notes).await,
        };

        if let Err(error) = result {
            tracing::error!("Failed to save notes to {}: {}", self.backend_name(), error);
            return SaveOutcome::Failed;
        }

        if let Some(cache) = &self.cache {
            self.refresh_cache(cache, notes);
        }

        SaveOutcome::Saved
    }

    // The cache either matches the last successful save or is absent.
    fn refresh_cache(&self, cache: &SimpleBackend, notes: &[Note]) {
        let Err(error) = cache.write(notes) else {
            return;
        };
        tracing::warn!(
            "Failed to refresh notes snapshot cache for {}: {}",
            self.backend_name(),
            error
        );
        if let Err(error) = cache.clear() {
            tracing::error!("Failed to remove outdated notes snapshot cache: {}", error);
        }
    }
}
