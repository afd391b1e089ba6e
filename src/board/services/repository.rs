//! Authoritative client-side task cache over the store port.
//!
//! The repository service is the sole owner of the in-memory collection.
//! Every operation goes through the store, catches failures at its own
//! boundary, records a human-readable message in the shared error field,
//! and leaves prior cache state untouched on failure. Reconciliation is
//! patch-from-response: a successful write applies its own response payload
//! to the cache instead of triggering a refetch, and each handler patches
//! only the fields its operation owns.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::board::{
    domain::{
        Comment, NewComment, NewTask, Task, TaskId, TaskPatch, TaskStatus, assign_ranks,
        position_of,
    },
    ports::{TaskStore, TaskStoreError},
};
use crate::directory::domain::UserId;

/// Errors surfaced by repository operations.
///
/// Every failure is also recorded in the shared error field before it is
/// returned, so UI-facing observers can poll [`TaskRepositoryService::last_error`]
/// instead of handling the typed value.
#[derive(Debug, Clone, Error)]
pub enum TaskSyncError {
    /// The underlying store rejected the operation.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for repository operations.
pub type TaskSyncResult<T> = Result<T, TaskSyncError>;

#[derive(Debug, Default)]
struct SharedState {
    tasks: Vec<Task>,
    fetches_in_flight: u32,
    last_error: Option<String>,
    /// Latest issued generation for collection-replacing operations.
    collection_generation: u64,
    /// Latest issued sequence number per task id for single-task writes.
    task_sequences: HashMap<TaskId, u64>,
}

impl SharedState {
    const fn next_collection_generation(&mut self) -> u64 {
        self.collection_generation += 1;
        self.collection_generation
    }

    fn next_task_sequence(&mut self, id: TaskId) -> u64 {
        let sequence = self.task_sequences.entry(id).or_insert(0);
        *sequence += 1;
        *sequence
    }

    fn is_latest_for_task(&self, id: TaskId, sequence: u64) -> bool {
        self.task_sequences.get(&id).copied() == Some(sequence)
    }
}

/// Client-side cache mediating all task reads and writes.
pub struct TaskRepositoryService<S> {
    store: Arc<S>,
    state: Arc<RwLock<SharedState>>,
}

impl<S> TaskRepositoryService<S>
where
    S: TaskStore,
{
    /// Creates a service over the given store with an empty cache.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(SharedState::default())),
        }
    }

    /// Returns a momentary snapshot of the cached collection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.read_state().tasks.clone()
    }

    /// Returns `true` while a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_state().fetches_in_flight > 0
    }

    /// Returns the most recently recorded failure message, if any.
    ///
    /// Errors are never cleared implicitly; a new failure overwrites the
    /// previous message and [`TaskRepositoryService::clear_error`] dismisses it.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    /// Dismisses the recorded failure message.
    pub fn clear_error(&self) {
        self.write_state().last_error = None;
    }

    /// Replaces the cache with the remote collection.
    ///
    /// The loading flag is raised for the duration of the call. A stale
    /// completion (one superseded by a newer collection-replacing
    /// operation) is discarded without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the fetch fails; the previous
    /// collection is left untouched.
    pub async fn refresh(&self) -> TaskSyncResult<()> {
        let generation = {
            let mut state = self.write_state();
            state.fetches_in_flight += 1;
            state.next_collection_generation()
        };

        let result = self.store.fetch_all().await;

        let mut state = self.write_state();
        state.fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
        match result {
            Ok(tasks) => {
                if state.collection_generation == generation {
                    tracing::debug!(count = tasks.len(), "collection refreshed");
                    state.tasks = tasks;
                } else {
                    tracing::debug!("stale fetch discarded");
                }
                Ok(())
            }
            Err(err) => {
                state.last_error = Some(err.to_string());
                tracing::warn!("fetch failed: {err}");
                Err(err.into())
            }
        }
    }

    /// Creates a task from a draft and inserts the stored record at the
    /// front of the cache (newest-first order).
    ///
    /// Title validation happens at draft construction, so an empty title
    /// never reaches this call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the insert fails; nothing is added
    /// locally in that case.
    pub async fn create(&self, draft: NewTask) -> TaskSyncResult<Task> {
        match self.store.insert(draft).await {
            Ok(task) => {
                let mut state = self.write_state();
                state.tasks.insert(0, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// Applies a partial update and replaces the cached record with the
    /// store's response.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the update fails.
    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskSyncResult<Task> {
        let sequence = self.write_state().next_task_sequence(id);
        match self.store.update(id, patch).await {
            Ok(task) => {
                let mut state = self.write_state();
                if state.is_latest_for_task(id, sequence)
                    && let Some(index) = position_of(&state.tasks, id)
                    && let Some(slot) = state.tasks.get_mut(index)
                {
                    *slot = task.clone();
                }
                Ok(task)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// Deletes a task remotely and, on success, removes it from the cache
    /// by filtering the collection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the delete fails; the cached record
    /// stays in place in that case.
    pub async fn delete(&self, id: TaskId) -> TaskSyncResult<()> {
        match self.store.delete(id).await {
            Ok(()) => {
                let mut state = self.write_state();
                state.tasks.retain(|task| task.id() != id);
                state.task_sequences.remove(&id);
                Ok(())
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// Moves a task to another status column.
    ///
    /// On success only the fields the operation owns (status and the
    /// update timestamp) are patched on the cached record, and only when
    /// the response is the latest issued for that task id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the status write fails.
    pub async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskSyncResult<Task> {
        let sequence = self.write_state().next_task_sequence(id);
        match self.store.set_status(id, status).await {
            Ok(task) => {
                let mut state = self.write_state();
                if state.is_latest_for_task(id, sequence) {
                    if let Some(index) = position_of(&state.tasks, id)
                        && let Some(slot) = state.tasks.get_mut(index)
                    {
                        slot.patch_status(task.status(), task.updated_at());
                    }
                } else {
                    tracing::debug!(task = %id, "stale status response discarded");
                }
                Ok(task)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// Replaces a task's assignee.
    ///
    /// Patches assignee and the update timestamp on the cached record,
    /// subject to the same latest-issued rule as [`Self::set_status`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the assignee write fails.
    pub async fn assign(&self, id: TaskId, assignee: UserId) -> TaskSyncResult<Task> {
        let sequence = self.write_state().next_task_sequence(id);
        match self.store.set_assignee(id, assignee).await {
            Ok(task) => {
                let mut state = self.write_state();
                if state.is_latest_for_task(id, sequence)
                    && let Some(index) = position_of(&state.tasks, id)
                    && let Some(slot) = state.tasks.get_mut(index)
                {
                    slot.patch_assignee(task.assignee().cloned(), task.updated_at());
                }
                Ok(task)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// Appends a comment and applies the stored record to the cached task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the append fails.
    pub async fn add_comment(&self, id: TaskId, draft: NewComment) -> TaskSyncResult<Comment> {
        match self.store.insert_comment(id, draft).await {
            Ok(comment) => {
                let mut state = self.write_state();
                if let Some(index) = position_of(&state.tasks, id)
                    && let Some(slot) = state.tasks.get_mut(index)
                {
                    slot.append_comment(comment.clone());
                }
                Ok(comment)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// Persists one rank per task for the given full-collection snapshot
    /// and, on success, replaces the cache with the snapshot verbatim.
    ///
    /// Ranks are global across the collection; a column's order is the
    /// stable filter of the global order. A stale completion is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError`] when the rank upsert fails; the cache
    /// keeps its previous order in that case.
    pub async fn reorder(&self, ordered: Vec<Task>) -> TaskSyncResult<()> {
        let ranks = assign_ranks(&ordered);
        let generation = self.write_state().next_collection_generation();

        match self.store.upsert_ranks(&ranks).await {
            Ok(()) => {
                let mut state = self.write_state();
                if state.collection_generation == generation {
                    state.tasks = ordered;
                } else {
                    tracing::debug!("stale reorder discarded");
                }
                Ok(())
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    fn record_failure(&self, err: TaskStoreError) -> TaskSyncError {
        self.write_state().last_error = Some(err.to_string());
        tracing::warn!("store operation failed: {err}");
        err.into()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SharedState> {
        // The lock is internal and no panic can occur while it is held;
        // a poisoned guard still carries a consistent cache.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SharedState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
