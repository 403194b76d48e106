//! Note lifecycle and debounced autosave.
//!
//! [`NoteStore`] owns the in-memory note list, the selected note and the live
//! edit buffer. Creating and deleting notes persist the whole collection at
//! once; buffer edits on a selected note are coalesced by a 500 ms debounce
//! timer so only the last value typed inside the window is ever written.
//!
//! The editing sub-machine moves between three states:
//!
//! - idle: nothing selected, empty buffer
//! - editing: a note is selected and the buffer tracks it, a timer may be armed
//! - drafting: nothing selected but the buffer holds text; the first
//!   non-blank edit immediately becomes a new note

mod state;
mod writer;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::{Note, NoteId};
use crate::storage::StorageManager;

use self::state::Shared;
use self::writer::Writer;

pub use self::state::StoreState;
pub use self::writer::SaveHandle;

/// Idle time after the last edit before the buffer is committed
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// The autosave and lifecycle engine.
///
/// All methods must be called from within a tokio runtime; the store spawns
/// its persistence writer, debounce timers and initial load on it.
pub struct NoteStore {
    shared: Arc<Shared>,
    storage: Arc<StorageManager>,
    load_task: Mutex<Option<JoinHandle<()>>>,
}

impl NoteStore {
    /// Open the store over `storage`.
    ///
    /// Returns immediately. With a synchronous backend the state is already
    /// final; otherwise the store starts from the manager's best-effort
    /// snapshot, reports [`Self::is_loading`], and reconciles when the
    /// asynchronous load finishes.
    pub fn open(storage: StorageManager) -> Self {
        let storage = Arc::new(storage);
        let asynchronous = !storage.is_synchronous();
        let provisional = storage.snapshot();

        let writer = Writer::spawn(Arc::clone(&storage));
        let shared = Arc::new(Shared::new(provisional, asynchronous, writer));

        let load_task = asynchronous.then(|| {
            let shared = Arc::clone(&shared);
            let storage = Arc::clone(&storage);
            tokio::spawn(async move {
                let loaded = storage.load_notes().await;
                shared.reconcile_initial_load(loaded);
            })
        });

        Self {
            shared,
            storage,
            load_task: Mutex::new(load_task),
        }
    }

    /// Create a note holding `initial_content`, put it first, and select it.
    ///
    /// The collection is persisted right away, without debouncing. Any
    /// pending autosave for the previously selected note is dropped.
    pub fn create_note(&self, initial_content: &str) -> (NoteId, SaveHandle) {
        let note = Note::new(initial_content);
        let id = note.id.clone();

        let mut session = self.shared.lock();
        session.cancel_autosave();
        session.mutations += 1;
        session.buffer = note.content.clone();
        session.selected_id = Some(id.clone());
        session.notes.insert(0, note);
        let handle = self.shared.persist(&mut session);
        drop(session);

        tracing::debug!("Created note {}", id);
        self.shared.notify();
        (id, handle)
    }

    /// Replace the edit buffer.
    ///
    /// The buffer changes immediately. With a note selected, the debounce
    /// timer is re-armed; with nothing selected, non-blank text is promoted
    /// into a new note on the spot.
    pub fn set_content(&self, text: impl Into<String>) {
        let text = text.into();
        let mut session = self.shared.lock();
        session.mutations += 1;

        if let Some(id) = session.selected_id.clone() {
            session.buffer = text;
            self.shared.arm_autosave(&mut session, id);
        } else if text.trim().is_empty() {
            session.buffer = text;
        } else {
            let note = Note::new(text.clone());
            tracing::debug!("Promoted draft buffer into note {}", note.id);
            session.selected_id = Some(note.id.clone());
            session.buffer = text;
            session.notes.insert(0, note);
            drop(self.shared.persist(&mut session));
        }

        drop(session);
        self.shared.notify();
    }

    /// Remove the note with `id`.
    ///
    /// Unknown ids are ignored and return `None`. Removing the selected note
    /// selects the new first note, or clears the selection and buffer when
    /// none remain.
    pub fn delete_note(&self, id: &NoteId) -> Option<SaveHandle> {
        let mut session = self.shared.lock();
        let index = session.position(id)?;

        session.notes.remove(index);
        session.mutations += 1;

        if session.selected_id.as_ref() == Some(id) {
            session.cancel_autosave();
            let first = session
                .notes
                .first()
                .map(|note| (note.id.clone(), note.content.clone()));
            match first {
                Some((first_id, content)) => {
                    session.selected_id = Some(first_id);
                    session.buffer = content;
                }
                None => {
                    session.selected_id = None;
                    session.buffer.clear();
                }
            }
        }

        let handle = self.shared.persist(&mut session);
        drop(session);

        tracing::debug!("Deleted note {}", id);
        self.shared.notify();
        Some(handle)
    }

    /// Select the note with `id` and load its stored content into the buffer.
    ///
    /// A pending autosave is cancelled, not flushed: edits typed within the
    /// last debounce window before switching are lost. Returns `false` for an
    /// unknown id, leaving everything untouched.
    pub fn switch_note(&self, id: &NoteId) -> bool {
        let mut session = self.shared.lock();
        let Some(content) = session
            .notes
            .iter()
            .find(|note| &note.id == id)
            .map(|note| note.content.clone())
        else {
            return false;
        };

        session.cancel_autosave();
        session.mutations += 1;
        session.selected_id = Some(id.clone());
        session.buffer = content;
        drop(session);

        self.shared.notify();
        true
    }

    /// Commit the buffer now instead of waiting for the debounce timer.
    ///
    /// Returns `None` when nothing is selected or the buffer matches the
    /// stored content.
    pub fn save_now(&self) -> Option<SaveHandle> {
        let mut session = self.shared.lock();
        session.cancel_autosave();
        let handle = self.shared.commit_buffer(&mut session);
        drop(session);

        if handle.is_some() {
            self.shared.notify();
        }
        handle
    }

    /// Resolve once every save issued so far has reached the backend.
    ///
    /// Saves held back by an outstanding initial load are included, so this
    /// first waits for the load. An armed debounce timer that has not fired
    /// yet is not waited for.
    pub async fn flush(&self) {
        self.loaded().await;
        self.shared.writer().barrier().await;
    }

    /// Wait for the asynchronous initial load to be reconciled
    pub async fn loaded(&self) {
        let task = self
            .load_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            if let Err(error) = task.await {
                tracing::error!("Initial note load task failed: {}", error);
                self.shared.reconcile_initial_load(Vec::new());
            }
            return;
        }

        // Another caller took the task; wait for its reconciliation.
        let mut changes = self.shared.subscribe();
        while self.is_loading() {
            if changes.changed().await.is_err() {
                break;
            }
        }
    }

    /// All notes, most recently created first
    pub fn notes(&self) -> Vec<Note> {
        self.shared.lock().notes.clone()
    }

    /// Id of the note bound to the buffer
    pub fn selected_id(&self) -> Option<NoteId> {
        self.shared.lock().selected_id.clone()
    }

    /// The selected note as last committed
    pub fn current_note(&self) -> Option<Note> {
        self.shared.lock().current_note().cloned()
    }

    /// Live editor text
    pub fn buffer(&self) -> String {
        self.shared.lock().buffer.clone()
    }

    /// Whether the asynchronous initial load is still outstanding
    pub fn is_loading(&self) -> bool {
        self.shared.lock().loading
    }

    /// Consistent copy of notes, selection, buffer and loading flag
    pub fn state(&self) -> StoreState {
        self.shared.lock().to_state()
    }

    /// Revision counter that ticks on every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.subscribe()
    }

    /// The storage manager this store persists through
    pub fn storage(&self) -> Arc<StorageManager> {
        Arc::clone(&self.storage)
    }
}

impl Drop for NoteStore {
    fn drop(&mut self) {
        self.shared.lock().cancel_autosave();
        if let Some(task) = self
            .load_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}
