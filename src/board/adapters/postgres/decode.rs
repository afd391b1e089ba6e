//! Explicit mapping layer from backend rows to domain types.
//!
//! Every conversion fails loudly with a typed [`DecodeError`] on shape
//! mismatch (an unknown status string, a dangling user reference) rather
//! than silently producing defaulted fields.

use std::collections::HashMap;
use uuid::Uuid;

use super::models::{CommentRow, TaskRow, UserRow};
use crate::board::{
    domain::{
        Collaborator, Comment, CommentId, PersistedTask, Priority, Task, TaskId, TaskStatus,
        TaskTitle,
    },
    ports::{DecodeError, TaskStoreResult},
};
use crate::directory::domain::UserId;

/// Converts a directory row into the board's collaborator view.
pub fn collaborator_from_row(row: &UserRow) -> Collaborator {
    Collaborator::from_row(
        UserId::from_uuid(row.id),
        row.name.clone(),
        row.email.clone(),
    )
}

/// Converts a comment row, resolving its author against loaded user rows.
pub fn comment_from_row(
    row: CommentRow,
    users: &HashMap<Uuid, UserRow>,
) -> TaskStoreResult<Comment> {
    let author = users
        .get(&row.author_id)
        .map(collaborator_from_row)
        .ok_or(DecodeError::MissingAuthor {
            comment: row.id,
            user: row.author_id,
        })?;
    Ok(Comment::new(
        CommentId::from_uuid(row.id),
        row.content,
        author,
        row.created_at,
    ))
}

/// Assembles a task aggregate from its row and resolved nested data.
pub fn task_from_rows(
    row: TaskRow,
    tags: Vec<String>,
    comments: Vec<Comment>,
    users: &HashMap<Uuid, UserRow>,
) -> TaskStoreResult<Task> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(DecodeError::from)?;
    let priority =
        Priority::try_from(row.priority.as_str()).map_err(DecodeError::from)?;
    let title =
        TaskTitle::new(row.title).map_err(|_| DecodeError::EmptyTitle { task: row.id })?;

    let creator = users
        .get(&row.creator_id)
        .map(collaborator_from_row)
        .ok_or(DecodeError::MissingCreator {
            task: row.id,
            user: row.creator_id,
        })?;
    let assignee = row
        .assignee_id
        .map(|user| {
            users
                .get(&user)
                .map(collaborator_from_row)
                .ok_or(DecodeError::MissingAssignee { task: row.id, user })
        })
        .transpose()?;

    Ok(Task::from_persisted(PersistedTask {
        id: TaskId::from_uuid(row.id),
        title,
        description: row.description,
        status,
        priority,
        due_date: row.due_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
        tags,
        attachments: Vec::new(),
        comments,
        assignee,
        creator,
    }))
}
