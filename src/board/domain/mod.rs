//! Domain model for board tasks.
//!
//! Models the task aggregate with its status, priority, tags, comments and
//! collaborator references, plus the pure derivations the board is built
//! from: the column projection, search filtering, and array-move ordering.
//! All infrastructure concerns stay outside the domain boundary.

mod collaborator;
mod comment;
mod error;
mod ids;
mod ordering;
mod projection;
mod task;

pub use collaborator::Collaborator;
pub use comment::{Attachment, Comment, NewComment};
pub use error::{BoardDomainError, ParsePriorityError, ParseTaskStatusError};
pub use ids::{AttachmentId, CommentId, TaskId, TaskTitle};
pub use ordering::{TaskRank, array_move, assign_ranks, position_of};
pub use projection::{BoardColumns, filter_tasks};
pub use task::{NewTask, PersistedTask, Priority, Task, TaskPatch, TaskStatus};
