//! Collaborator value object: the board's view of a directory user.

use crate::directory::domain::{UserId, UserProfile};
use serde::{Deserialize, Serialize};

/// Resolved user reference carried on tasks and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    id: UserId,
    name: String,
    email: String,
}

impl Collaborator {
    /// Creates a collaborator from resolved fields.
    #[must_use]
    pub const fn new(id: UserId, name: String, email: String) -> Self {
        Self { id, name, email }
    }

    /// Creates a collaborator from a directory profile.
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            id: profile.id(),
            name: profile.display_name().to_owned(),
            email: profile.email().to_owned(),
        }
    }

    /// Creates a collaborator from raw storage fields.
    ///
    /// When the directory row carries no name, the display name falls back
    /// to the local part of the email address.
    #[must_use]
    pub fn from_row(id: UserId, name: Option<String>, email: String) -> Self {
        let display =
            name.unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_owned());
        Self {
            id,
            name: display,
            email,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
