//! Session state shared between the store, its autosave timer and its
//! initial-load task

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::models::{Note, NoteId};
use crate::storage::SaveOutcome;

use super::writer::{SaveHandle, Writer};
use super::AUTOSAVE_DEBOUNCE;

/// Point-in-time copy of everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    /// Notes, most recently created first
    pub notes: Vec<Note>,
    /// Note bound to the edit buffer
    pub selected_id: Option<NoteId>,
    /// Live editor text, possibly ahead of the stored content
    pub buffer: String,
    /// True while an asynchronous initial load is outstanding
    pub loading: bool,
}

struct PendingAutosave {
    task: JoinHandle<()>,
}

pub(crate) struct Session {
    pub(crate) notes: Vec<Note>,
    pub(crate) selected_id: Option<NoteId>,
    pub(crate) buffer: String,
    pub(crate) loading: bool,
    // Local mutations since open.
    pub(crate) mutations: u64,
    // Provisional collection the session started from while loading.
    baseline: Vec<Note>,
    // Saves requested while loading; written once the load is reconciled.
    deferred: Vec<oneshot::Sender<SaveOutcome>>,
    generation: u64,
    autosave: Option<PendingAutosave>,
}

impl Session {
    fn new(notes: Vec<Note>, loading: bool) -> Self {
        let mut session = Self {
            notes: Vec::new(),
            selected_id: None,
            buffer: String::new(),
            loading,
            mutations: 0,
            baseline: if loading { notes.clone() } else { Vec::new() },
            deferred: Vec::new(),
            generation: 0,
            autosave: None,
        };
        session.replace_notes(notes);
        session
    }

    /// Install a loaded collection, selecting its first note
    pub(crate) fn replace_notes(&mut self, notes: Vec<Note>) {
        self.selected_id = notes.first().map(|note| note.id.clone());
        self.buffer = notes
            .first()
            .map(|note| note.content.clone())
            .unwrap_or_default();
        self.notes = notes;
    }

    /// Install a merged collection, keeping the selection and buffer when the
    /// selected note survived
    fn adopt_merged(&mut self, notes: Vec<Note>) {
        self.notes = notes;
        let selected_survives = self
            .selected_id
            .as_ref()
            .is_some_and(|id| self.position(id).is_some());

        if !selected_survives {
            self.cancel_autosave();
            let notes = std::mem::take(&mut self.notes);
            self.replace_notes(notes);
        }
    }

    pub(crate) fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    pub(crate) fn current_note(&self) -> Option<&Note> {
        let id = self.selected_id.as_ref()?;
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Drop any armed timer without committing
    pub(crate) fn cancel_autosave(&mut self) {
        self.generation += 1;
        if let Some(pending) = self.autosave.take() {
            pending.task.abort();
        }
    }

    pub(crate) fn to_state(&self) -> StoreState {
        StoreState {
            notes: self.notes.clone(),
            selected_id: self.selected_id.clone(),
            buffer: self.buffer.clone(),
            loading: self.loading,
        }
    }
}

/// Replay the local edits made on top of `baseline` onto `loaded`.
///
/// Notes created locally go first, in local order. Local edits replace the
/// loaded version of the same note. Notes deleted locally are removed. Notes
/// that were in `baseline` but are absent from `loaded` and were not edited
/// locally stay deleted.
pub(crate) fn merge_local_changes(
    baseline: &[Note],
    local: &[Note],
    loaded: Vec<Note>,
) -> Vec<Note> {
    let base: HashMap<&NoteId, &Note> = baseline.iter().map(|note| (&note.id, note)).collect();
    let local_ids: HashSet<&NoteId> = local.iter().map(|note| &note.id).collect();
    let loaded_ids: HashSet<NoteId> = loaded.iter().map(|note| note.id.clone()).collect();

    let changed: HashMap<&NoteId, &Note> = local
        .iter()
        .filter(|note| base.get(&note.id).is_none_or(|before| *before != *note))
        .map(|note| (&note.id, note))
        .collect();

    let mut merged: Vec<Note> = local
        .iter()
        .filter(|note| changed.contains_key(&note.id) && !loaded_ids.contains(&note.id))
        .cloned()
        .collect();

    for note in loaded {
        if base.contains_key(&note.id) && !local_ids.contains(&note.id) {
            continue;
        }
        match changed.get(&note.id) {
            Some(local_note) => merged.push((*local_note).clone()),
            None => merged.push(note),
        }
    }

    merged
}

pub(crate) struct Shared {
    session: Mutex<Session>,
    writer: Writer,
    revision: watch::Sender<u64>,
}

impl Shared {
    pub(crate) fn new(notes: Vec<Note>, loading: bool, writer: Writer) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            session: Mutex::new(Session::new(notes, loading)),
            writer,
            revision,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) const fn writer(&self) -> &Writer {
        &self.writer
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Tell subscribers the state changed
    pub(crate) fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Queue the current collection for persistence.
    ///
    /// While the initial load is outstanding nothing is written: the save is
    /// held until the loaded collection has been reconciled, so a provisional
    /// snapshot never overwrites newer stored notes.
    pub(crate) fn persist(&self, session: &mut Session) -> SaveHandle {
        if session.loading {
            let (handle, waiter) = SaveHandle::pending();
            session.deferred.push(waiter);
            return handle;
        }
        self.writer.persist(session.notes.clone())
    }

    /// Cancel-and-reschedule the debounce timer for the selected note
    pub(crate) fn arm_autosave(self: &Arc<Self>, session: &mut Session, id: NoteId) {
        session.cancel_autosave();
        let generation = session.generation;
        let shared = Arc::clone(self);

        let task = tokio::spawn(async move {
            tokio::time::sleep(AUTOSAVE_DEBOUNCE).await;
            shared.fire_autosave(generation, &id);
        });
        session.autosave = Some(PendingAutosave { task });
    }

    fn fire_autosave(&self, generation: u64, id: &NoteId) {
        let mut session = self.lock();
        // A newer edit, a switch or a delete re-armed or cancelled the timer.
        if session.generation != generation || session.selected_id.as_ref() != Some(id) {
            return;
        }
        session.autosave = None;

        if self.commit_buffer(&mut session).is_some() {
            drop(session);
            self.notify();
        }
    }

    /// Write the buffer into the selected note if it differs from the stored
    /// content. Unchanged content is not written.
    pub(crate) fn commit_buffer(&self, session: &mut Session) -> Option<SaveHandle> {
        let id = session.selected_id.clone()?;
        let index = session.position(&id)?;

        if session.notes[index].content == session.buffer {
            tracing::debug!("Autosave skipped for {}: content unchanged", id);
            return None;
        }

        let updated = session.notes[index].with_content(session.buffer.clone());
        session.notes[index] = updated;
        tracing::debug!("Autosaved note {}", id);
        Some(self.persist(session))
    }

    /// Apply the result of the asynchronous initial load.
    ///
    /// An empty result keeps the provisional state. Without local changes a
    /// non-empty result replaces it; with local changes those changes are
    /// merged into the loaded collection. Saves held during the load are
    /// then written as one snapshot.
    pub(crate) fn reconcile_initial_load(&self, loaded: Vec<Note>) {
        let mut session = self.lock();
        if !session.loading {
            return;
        }
        session.loading = false;
        let baseline = std::mem::take(&mut session.baseline);
        let waiters = std::mem::take(&mut session.deferred);

        if loaded.is_empty() || loaded == baseline {
            tracing::debug!("Initial load matches provisional notes");
        } else if session.mutations == 0 {
            tracing::debug!("Initial load replaced provisional notes ({} notes)", loaded.len());
            session.replace_notes(loaded);
        } else {
            let merged = merge_local_changes(&baseline, &session.notes, loaded);
            tracing::warn!(
                "Merged local changes made while loading into {} stored notes",
                merged.len()
            );
            session.adopt_merged(merged);
        }

        if !waiters.is_empty() {
            self.writer.persist_for(session.notes.clone(), waiters);
        }

        drop(session);
        self.notify();
    }
}
