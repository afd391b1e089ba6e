//! Lookup port for the external user directory.

use crate::directory::domain::{UserId, UserProfile};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Read-only contract against the collaborator service.
///
/// The directory is external and read-mostly: implementations look profiles
/// up but never create or mutate them on behalf of this crate.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a profile by user identifier.
    ///
    /// Returns `None` when the directory has no entry for the id.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the lookup itself fails.
    async fn find(&self, id: UserId) -> UserDirectoryResult<Option<UserProfile>>;

    /// Returns all known profiles.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the listing fails.
    async fn list(&self) -> UserDirectoryResult<Vec<UserProfile>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Directory-service failure.
    #[error("directory error: {0}")]
    Service(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a directory-service error.
    pub fn service(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Service(Arc::new(err))
    }
}
