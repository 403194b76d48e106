//! Persistence queue.
//!
//! Every snapshot the store persists goes through one writer task, so saves
//! reach the backend one at a time and in the order they were issued.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::models::Note;
use crate::storage::{SaveOutcome, StorageManager};

pub(crate) enum WriteJob {
    Persist {
        notes: Vec<Note>,
        waiters: Vec<oneshot::Sender<SaveOutcome>>,
    },
    Barrier(oneshot::Sender<()>),
}

/// Completion signal for one persisted snapshot.
///
/// Interactive callers may drop it; tests and reconciliation logic await it.
#[derive(Debug)]
#[must_use = "dropping the handle is fine, but awaiting it is the only way to observe the save"]
pub struct SaveHandle {
    done: oneshot::Receiver<SaveOutcome>,
}

impl SaveHandle {
    /// A handle completed later through the returned sender
    pub(crate) fn pending() -> (Self, oneshot::Sender<SaveOutcome>) {
        let (waiter, done) = oneshot::channel();
        (Self { done }, waiter)
    }

    /// Wait until the snapshot has been handed to the backend
    pub async fn wait(self) -> SaveOutcome {
        self.done.await.unwrap_or(SaveOutcome::Failed)
    }
}

#[derive(Clone)]
pub(crate) struct Writer {
    jobs: mpsc::UnboundedSender<WriteJob>,
}

impl Writer {
    /// Spawn the writer task on the current runtime
    pub(crate) fn spawn(storage: Arc<StorageManager>) -> Self {
        let (jobs, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run(storage, receiver));
        Self { jobs }
    }

    /// Queue a full-collection snapshot
    pub(crate) fn persist(&self, notes: Vec<Note>) -> SaveHandle {
        let (handle, waiter) = SaveHandle::pending();
        self.persist_for(notes, vec![waiter]);
        handle
    }

    /// Queue a snapshot whose outcome completes every handle in `waiters`
    pub(crate) fn persist_for(
        &self,
        notes: Vec<Note>,
        waiters: Vec<oneshot::Sender<SaveOutcome>>,
    ) {
        if self.jobs.send(WriteJob::Persist { notes, waiters }).is_err() {
            tracing::error!("Persistence writer has stopped; dropping save");
        }
    }

    /// Resolve once every job queued before this call has finished
    pub(crate) async fn barrier(&self) {
        let (done, receiver) = oneshot::channel();
        if self.jobs.send(WriteJob::Barrier(done)).is_ok() {
            receiver.await.ok();
        }
    }
}

async fn run(storage: Arc<StorageManager>, mut jobs: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(job) = jobs.recv().await {
        match job {
            WriteJob::Persist { notes, waiters } => {
                let outcome = storage.save_notes(&notes).await;
                tracing::debug!("Persisted {} notes: {:?}", notes.len(), outcome);
                for waiter in waiters {
                    waiter.send(outcome).ok();
                }
            }
            WriteJob::Barrier(done) => {
                done.send(()).ok();
            }
        }
    }
}
