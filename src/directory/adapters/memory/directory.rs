//! Seeded in-memory implementation of the directory port.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::directory::{
    domain::{UserId, UserProfile},
    ports::{UserDirectory, UserDirectoryResult},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    profiles: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a profile, replacing any existing entry for the same id.
    pub fn seed(&self, profile: UserProfile) {
        let mut profiles = self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        profiles.insert(profile.id(), profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find(&self, id: UserId) -> UserDirectoryResult<Option<UserProfile>> {
        let profiles = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(&id).cloned())
    }

    async fn list(&self) -> UserDirectoryResult<Vec<UserProfile>> {
        let profiles = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<UserProfile> = profiles.values().cloned().collect();
        entries.sort_by(|a, b| a.email().cmp(b.email()));
        Ok(entries)
    }
}
