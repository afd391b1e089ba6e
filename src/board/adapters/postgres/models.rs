//! Diesel row models for board persistence.

use super::schema::{task_comments, task_tags, tasks, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Status column as stored.
    pub status: String,
    /// Priority level as stored.
    pub priority: String,
    /// Optional assignee reference.
    pub assignee_id: Option<Uuid>,
    /// Creating user reference.
    pub creator_id: Uuid,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted global rank.
    pub rank: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Status column as stored.
    pub status: String,
    /// Priority level as stored.
    pub priority: String,
    /// Optional assignee reference.
    pub assignee_id: Option<Uuid>,
    /// Creating user reference.
    pub creator_id: Uuid,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted global rank.
    pub rank: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial-update changeset for task records.
///
/// `None` fields are left untouched by Diesel, mirroring patch semantics.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// Replacement title, if any.
    pub title: Option<String>,
    /// Replacement description, if any.
    pub description: Option<String>,
    /// Replacement status, if any.
    pub status: Option<String>,
    /// Replacement priority, if any.
    pub priority: Option<String>,
    /// Replacement assignee, if any.
    pub assignee_id: Option<Uuid>,
    /// Replacement due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// New update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for tag records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TagRow {
    /// Surrogate row identifier.
    pub id: i64,
    /// Owning task.
    pub task_id: Uuid,
    /// Tag value.
    pub tag: String,
    /// Position within the task's tag list.
    pub position: i32,
}

/// Insert model for tag records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_tags)]
pub struct NewTagRow {
    /// Owning task.
    pub task_id: Uuid,
    /// Tag value.
    pub tag: String,
    /// Position within the task's tag list.
    pub position: i32,
}

/// Query result row for comment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Authoring user reference.
    pub author_id: Uuid,
    /// Comment body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_comments)]
pub struct NewCommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Authoring user reference.
    pub author_id: Uuid,
    /// Comment body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for directory users.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: Uuid,
    /// Optional display name.
    pub name: Option<String>,
    /// Email address.
    pub email: String,
    /// Reported presence state.
    pub presence: String,
    /// Optional last-seen timestamp.
    pub last_seen: Option<DateTime<Utc>>,
}
