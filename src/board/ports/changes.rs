//! Change-feed port for server-pushed task-table notifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Kind of remote mutation reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A task row was inserted.
    Insert,
    /// A task row was updated.
    Update,
    /// A task row was deleted.
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{label}")
    }
}

/// One change notification.
///
/// The event is a trigger signal: subscribers resynchronise by refetching
/// the collection and do not consume a payload beyond the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskChange {
    /// Kind of mutation that occurred.
    pub kind: ChangeKind,
}

impl TaskChange {
    /// Creates a change notification.
    #[must_use]
    pub const fn new(kind: ChangeKind) -> Self {
        Self { kind }
    }
}

/// Subscription contract for the task-table change feed.
///
/// The feed is broadcast: every subscriber receives every event emitted
/// after its subscription. Receivers that fall behind observe a lag error
/// rather than blocking the feed.
pub trait ChangeFeed: Send + Sync {
    /// Opens a new subscription covering all event kinds.
    fn subscribe(&self) -> broadcast::Receiver<TaskChange>;
}
