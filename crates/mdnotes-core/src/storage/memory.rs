//! In-memory backend that records every save

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::Note;

use super::NoteBackend;

#[derive(Debug, Default)]
struct MemoryState {
    notes: Vec<Note>,
    saves: Vec<Vec<Note>>,
    failing: bool,
}

/// Keeps the collection in process memory.
///
/// Every save is appended to a history, which makes the backend useful for
/// observing exactly what the note engine persisted and when. With a latency
/// set it behaves like an asynchronous backend: loads resolve only after the
/// delay has elapsed.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl MemoryBackend {
    /// Create a backend pre-populated with `notes`
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                notes,
                ..MemoryState::default()
            }),
            latency: None,
        }
    }

    /// Delay every load by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Load latency, if any
    pub const fn latency(&self) -> Option<Duration> {
        self.latency
    }

    /// Current stored collection
    pub fn notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    /// Every collection passed to `save`, oldest first
    pub fn saves(&self) -> Vec<Vec<Note>> {
        self.lock().saves.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.lock().saves.len()
    }

    /// Make subsequent saves fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<Note>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.notes())
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        let mut state = self.lock();
        if state.failing {
            return Err(Error::Database("memory backend set to fail".to_string()));
        }
        state.notes = notes.to_vec();
        state.saves.push(notes.to_vec());
        Ok(())
    }
}
