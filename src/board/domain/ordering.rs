//! Array-move ordering and rank assignment.

use super::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// Persisted position of one task within the global ordering.
///
/// Ranks are global across the whole collection, not per column: a column's
/// visible order is the stable filter of the global order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRank {
    /// Task the rank belongs to.
    pub task_id: TaskId,
    /// Zero-based position within the global ordering.
    pub rank: i64,
}

/// Moves one element from `from` to `to`, preserving the relative order of
/// all other elements.
///
/// Matches drag-and-drop array-move semantics: remove at the old index,
/// insert at the new index. An out-of-range `from` is a no-op; `to` is
/// clamped to the collection end.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let target = to.min(items.len());
    items.insert(target, item);
}

/// Returns the flat index of the task with the given id.
#[must_use]
pub fn position_of(tasks: &[Task], id: TaskId) -> Option<usize> {
    tasks.iter().position(|task| task.id() == id)
}

/// Assigns one rank per task from the collection order.
#[must_use]
pub fn assign_ranks(tasks: &[Task]) -> Vec<TaskRank> {
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| TaskRank {
            task_id: task.id(),
            rank: i64::try_from(index).unwrap_or(i64::MAX),
        })
        .collect()
}
