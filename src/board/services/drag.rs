//! Drag coordination: gestures become status and order changes.
//!
//! A drag moves through `Idle → Dragging → Committing → Idle`. Completing a
//! drag computes the new flat position with array-move semantics, resolves
//! the destination column, then persists sequentially: status first, order
//! second. The reordered snapshot already carries the new status, so a
//! successful reorder cannot revert the status patch.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use super::repository::{TaskRepositoryService, TaskSyncError};
use crate::board::{
    domain::{BoardColumns, Task, TaskId, TaskStatus, array_move, position_of},
    ports::TaskStore,
};

/// Where a dragged task was dropped.
///
/// A drop resolves either through a sibling task or through an explicit
/// column identifier, so an empty column is a valid target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Dropped onto another task; the destination is that task's column.
    Task(TaskId),
    /// Dropped onto a column surface, including an empty one.
    Column(TaskStatus),
}

/// Phase of the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// No drag in progress.
    #[default]
    Idle,
    /// A task has been picked up.
    Dragging {
        /// Task being dragged.
        active: TaskId,
    },
    /// The drop is being persisted.
    Committing {
        /// Task being committed.
        active: TaskId,
    },
}

/// Result of completing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The drop targeted the active task itself; nothing was written.
    NoChange,
    /// The active task or the target vanished mid-drag; nothing was
    /// written.
    TargetVanished,
    /// Status and order were persisted.
    Moved {
        /// Column the task now belongs to.
        destination: TaskStatus,
        /// Whether the drop crossed columns.
        status_changed: bool,
    },
}

/// Errors returned by drag transitions.
#[derive(Debug, Clone, Error)]
pub enum DragError {
    /// `begin` was called while a drag was already in progress.
    #[error("a drag is already in progress")]
    AlreadyDragging,

    /// `complete` was called with no drag in progress.
    #[error("no drag in progress")]
    NotDragging,

    /// `begin` named a task missing from the cached collection.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// Persisting the drop failed.
    #[error(transparent)]
    Sync(#[from] TaskSyncError),
}

/// Turns drag gestures into consistent status + order changes.
pub struct DragCoordinator<S> {
    repository: Arc<TaskRepositoryService<S>>,
    phase: Mutex<DragPhase>,
}

impl<S> DragCoordinator<S>
where
    S: TaskStore,
{
    /// Creates a coordinator over the given repository.
    #[must_use]
    pub fn new(repository: Arc<TaskRepositoryService<S>>) -> Self {
        Self {
            repository,
            phase: Mutex::new(DragPhase::Idle),
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        *self.lock_phase()
    }

    /// Picks up a task.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::AlreadyDragging`] when a drag is in progress or
    /// [`DragError::UnknownTask`] when the task is not in the cache.
    pub fn begin(&self, active: TaskId) -> Result<(), DragError> {
        let snapshot = self.repository.snapshot();
        if position_of(&snapshot, active).is_none() {
            return Err(DragError::UnknownTask(active));
        }

        let mut phase = self.lock_phase();
        if *phase != DragPhase::Idle {
            return Err(DragError::AlreadyDragging);
        }
        *phase = DragPhase::Dragging { active };
        Ok(())
    }

    /// Abandons a drag without writing anything.
    pub fn cancel(&self) {
        let mut phase = self.lock_phase();
        if let DragPhase::Dragging { .. } = *phase {
            *phase = DragPhase::Idle;
        }
    }

    /// Completes a drag over the given target.
    ///
    /// Dropping a task onto itself produces zero writes and zero cache
    /// mutation. A target that no longer resolves produces no persistence
    /// call either. Otherwise the status write happens first; if it fails
    /// the order write is not attempted, and if the order write fails the
    /// system is left with correct status but stale order until the next
    /// resync.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NotDragging`] outside the dragging phase, or a
    /// wrapped [`TaskSyncError`] when persistence fails.
    pub async fn complete(&self, target: DropTarget) -> Result<DragOutcome, DragError> {
        let active = {
            let phase = self.lock_phase();
            match *phase {
                DragPhase::Dragging { active } => active,
                DragPhase::Idle | DragPhase::Committing { .. } => {
                    return Err(DragError::NotDragging);
                }
            }
        };

        if let DropTarget::Task(over) = target
            && over == active
        {
            self.set_phase(DragPhase::Idle);
            return Ok(DragOutcome::NoChange);
        }

        let mut snapshot = self.repository.snapshot();
        let Some(moved) = plan_move(&mut snapshot, active, target) else {
            self.set_phase(DragPhase::Idle);
            return Ok(DragOutcome::TargetVanished);
        };

        self.set_phase(DragPhase::Committing { active });
        let result = self.commit(active, moved, snapshot).await;
        self.set_phase(DragPhase::Idle);
        result.map_err(DragError::from)
    }

    async fn commit(
        &self,
        active: TaskId,
        moved: PlannedMove,
        mut snapshot: Vec<Task>,
    ) -> Result<DragOutcome, TaskSyncError> {
        let confirmed = self
            .repository
            .set_status(active, moved.destination)
            .await?;

        // Carry the confirmed status into the snapshot before persisting
        // the order, so the cache replacement cannot revert the patch.
        if let Some(index) = position_of(&snapshot, active)
            && let Some(slot) = snapshot.get_mut(index)
        {
            slot.patch_status(confirmed.status(), confirmed.updated_at());
        }

        self.repository.reorder(snapshot).await?;
        Ok(DragOutcome::Moved {
            destination: moved.destination,
            status_changed: moved.status_changed,
        })
    }

    fn set_phase(&self, next: DragPhase) {
        *self.lock_phase() = next;
    }

    fn lock_phase(&self) -> std::sync::MutexGuard<'_, DragPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy)]
struct PlannedMove {
    destination: TaskStatus,
    status_changed: bool,
}

/// Applies the array move to the snapshot and resolves the destination
/// column. Returns `None` when the active task or the target cannot be
/// resolved any more.
fn plan_move(snapshot: &mut Vec<Task>, active: TaskId, target: DropTarget) -> Option<PlannedMove> {
    let old_index = position_of(snapshot, active)?;
    let previous_status = snapshot.get(old_index)?.status();

    let destination = match target {
        DropTarget::Task(over) => {
            let columns = BoardColumns::project(snapshot);
            let destination = columns.column_of(over)?;
            let new_index = position_of(snapshot, over)?;
            array_move(snapshot, old_index, new_index);
            destination
        }
        DropTarget::Column(status) => {
            let new_index = column_end_index(snapshot, status, old_index);
            array_move(snapshot, old_index, new_index);
            status
        }
    };

    Some(PlannedMove {
        destination,
        status_changed: destination != previous_status,
    })
}

/// Index that places the moving task at the end of the given column, or at
/// the end of the flat collection when the column is empty.
fn column_end_index(tasks: &[Task], status: TaskStatus, moving: usize) -> usize {
    tasks
        .iter()
        .rposition(|task| task.status() == status)
        .map_or(tasks.len(), |last| {
            if moving <= last { last } else { last + 1 }
        })
}
