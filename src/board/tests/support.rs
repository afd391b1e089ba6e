//! Shared fixtures and builders for board tests.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::board::domain::{
    Collaborator, Comment, NewComment, NewTask, PersistedTask, Priority, Task, TaskId, TaskPatch,
    TaskRank, TaskStatus, TaskTitle,
};
use crate::board::ports::{TaskStore, TaskStoreResult};
use crate::directory::domain::{Presence, UserId, UserProfile};

mockall::mock! {
    /// Mock of the store port for failure injection and call verification.
    pub Store {}

    #[async_trait]
    impl TaskStore for Store {
        async fn fetch_all(&self) -> TaskStoreResult<Vec<Task>>;
        async fn insert(&self, draft: NewTask) -> TaskStoreResult<Task>;
        async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task>;
        async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;
        async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskStoreResult<Task>;
        async fn set_assignee(&self, id: TaskId, assignee: UserId) -> TaskStoreResult<Task>;
        async fn upsert_ranks(&self, ranks: &[TaskRank]) -> TaskStoreResult<()>;
        async fn insert_comment(
            &self,
            task_id: TaskId,
            draft: NewComment,
        ) -> TaskStoreResult<Comment>;
    }
}

/// Fixed base instant so ordering assertions are deterministic.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid base time")
}

pub fn creator() -> Collaborator {
    Collaborator::new(
        UserId::new(),
        "John Doe".to_owned(),
        "john@example.com".to_owned(),
    )
}

pub fn profile(name: &str, email: &str) -> UserProfile {
    UserProfile::new(
        UserId::new(),
        Some(name.to_owned()),
        email.to_owned(),
        Presence::Online,
        None,
    )
}

/// Builds a task with a deterministic creation offset in seconds.
pub fn task_named(title: &str, status: TaskStatus, created_offset_secs: i64) -> Task {
    let created_at = base_time() + Duration::seconds(created_offset_secs);
    Task::from_persisted(PersistedTask {
        id: TaskId::new(),
        title: TaskTitle::new(title).expect("valid title"),
        description: None,
        status,
        priority: Priority::Medium,
        due_date: None,
        created_at,
        updated_at: created_at,
        tags: Vec::new(),
        attachments: Vec::new(),
        comments: Vec::new(),
        assignee: None,
        creator: creator(),
    })
}

/// Returns a copy of the task moved to another column, stamped later.
pub fn with_status(task: &Task, status: TaskStatus) -> Task {
    let mut moved = task.clone();
    moved.patch_status(status, task.updated_at() + Duration::seconds(1));
    moved
}
