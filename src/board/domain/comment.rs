//! Comment and attachment value objects.

use super::{AttachmentId, BoardDomainError, Collaborator, CommentId};
use crate::directory::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only comment owned by exactly one task.
///
/// Comments are never mutated or reordered after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    content: String,
    author: Collaborator,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment from store-assigned fields.
    #[must_use]
    pub const fn new(
        id: CommentId,
        content: String,
        author: Collaborator,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content,
            author,
            created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the comment body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the comment author.
    #[must_use]
    pub const fn author(&self) -> &Collaborator {
        &self.author
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Draft for appending a comment to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    content: String,
    author: UserId,
}

impl NewComment {
    /// Creates a validated comment draft.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyCommentContent`] if the content is
    /// empty after trimming.
    pub fn new(content: impl Into<String>, author: UserId) -> Result<Self, BoardDomainError> {
        let raw = content.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyCommentContent);
        }
        Ok(Self {
            content: trimmed.to_owned(),
            author,
        })
    }

    /// Returns the comment body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the authoring user.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }
}

/// File attachment reference carried on tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    id: AttachmentId,
    name: String,
    media_type: String,
    url: String,
    size: u64,
    uploaded_at: DateTime<Utc>,
}

impl Attachment {
    /// Creates an attachment reference.
    #[must_use]
    pub const fn new(
        id: AttachmentId,
        name: String,
        media_type: String,
        url: String,
        size: u64,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            media_type,
            url,
            size,
            uploaded_at,
        }
    }

    /// Returns the attachment identifier.
    #[must_use]
    pub const fn id(&self) -> AttachmentId {
        self.id
    }

    /// Returns the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the media type.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}
