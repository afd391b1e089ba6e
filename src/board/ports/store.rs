//! Store port for task persistence against the remote backend.

use crate::board::domain::{
    Comment, NewComment, NewTask, ParsePriorityError, ParseTaskStatusError, Task, TaskId,
    TaskPatch, TaskRank, TaskStatus,
};
use crate::directory::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Persistence contract against the remote task table.
///
/// Implementations assign identity and timestamps on insert, resolve nested
/// collaborator, comment, and tag data on reads, and report failures as
/// typed errors, never panics. Writes return the affected record so
/// callers can reconcile their cache from the response payload instead of
/// refetching.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetches the full collection, ordered by descending creation time,
    /// with assignee, creator, comments, and tags resolved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the query or row decoding fails.
    async fn fetch_all(&self) -> TaskStoreResult<Vec<Task>>;

    /// Persists a new task and its tag rows, assigning id and timestamps.
    ///
    /// The write is all-or-nothing from the caller's perspective: a tag-row
    /// failure fails the whole insert.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::UnknownUser`] when the creator or assignee
    /// cannot be resolved, or a backend error when persistence fails.
    async fn insert(&self, draft: NewTask) -> TaskStoreResult<Task>;

    /// Applies a partial update. A tag list in the patch replaces the
    /// stored set wholesale (delete-all-then-insert).
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist:
    /// a reported failure, not a panic.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Moves a task to another status column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskStoreResult<Task>;

    /// Replaces a task's assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist or
    /// [`TaskStoreError::UnknownUser`] when the assignee cannot be resolved.
    async fn set_assignee(&self, id: TaskId, assignee: UserId) -> TaskStoreResult<Task>;

    /// Persists one rank per task, upserted and conflict-resolved by id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the upsert fails; partial rank
    /// application is treated as failure of the whole batch.
    async fn upsert_ranks(&self, ranks: &[TaskRank]) -> TaskStoreResult<()>;

    /// Appends a comment to a task, assigning id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist or
    /// [`TaskStoreError::UnknownUser`] when the author cannot be resolved.
    async fn insert_comment(
        &self,
        task_id: TaskId,
        draft: NewComment,
    ) -> TaskStoreResult<Comment>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A referenced user has no directory entry.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// A backend row did not decode into a domain value.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Backend connection or query failure.
    #[error("backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Typed decode failures at the storage boundary.
///
/// Backend-shaped rows are converted into domain types by an explicit
/// mapping layer; a shape mismatch fails loudly here instead of silently
/// producing defaulted fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A stored status string is not one of the four columns.
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),

    /// A stored priority string is not a known level.
    #[error(transparent)]
    Priority(#[from] ParsePriorityError),

    /// A stored title failed validation.
    #[error("task {task} carries an empty title")]
    EmptyTitle {
        /// Task whose row is malformed.
        task: Uuid,
    },

    /// A task row references a creator with no user row.
    #[error("task {task} references missing creator {user}")]
    MissingCreator {
        /// Task whose row is malformed.
        task: Uuid,
        /// Dangling user reference.
        user: Uuid,
    },

    /// A task row references an assignee with no user row.
    #[error("task {task} references missing assignee {user}")]
    MissingAssignee {
        /// Task whose row is malformed.
        task: Uuid,
        /// Dangling user reference.
        user: Uuid,
    },

    /// A comment row references an author with no user row.
    #[error("comment {comment} references missing author {user}")]
    MissingAuthor {
        /// Comment whose row is malformed.
        comment: Uuid,
        /// Dangling user reference.
        user: Uuid,
    },
}
