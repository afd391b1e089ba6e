//! Application services for board synchronisation.

mod drag;
mod rate_limit;
mod repository;
mod subscriber;

pub use drag::{DragCoordinator, DragError, DragOutcome, DragPhase, DropTarget};
pub use rate_limit::{RateDecision, ResyncLimiter};
pub use repository::{TaskRepositoryService, TaskSyncError, TaskSyncResult};
pub use subscriber::{ChangeSubscriber, SyncConfig};
