//! Pure column projection and search filtering over the flat collection.

use super::{Task, TaskId, TaskStatus};

/// The four status columns derived from a flat task collection.
///
/// Projection is a stable filter: within each column, tasks keep the
/// relative order they have in the input collection. The projection stores
/// no state of its own; correctness of the visible order therefore rests on
/// the repository keeping rank order in the underlying collection order.
#[derive(Debug)]
pub struct BoardColumns<'a> {
    todo: Vec<&'a Task>,
    in_progress: Vec<&'a Task>,
    review: Vec<&'a Task>,
    done: Vec<&'a Task>,
}

impl<'a> BoardColumns<'a> {
    /// Partitions the collection into the four status columns.
    #[must_use]
    pub fn project(tasks: &'a [Task]) -> Self {
        let mut columns = Self {
            todo: Vec::new(),
            in_progress: Vec::new(),
            review: Vec::new(),
            done: Vec::new(),
        };
        for task in tasks {
            columns.column_mut(task.status()).push(task);
        }
        columns
    }

    /// Returns the tasks in one column, in collection order.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Review => &self.review,
            TaskStatus::Done => &self.done,
        }
    }

    /// Returns the number of tasks in one column.
    #[must_use]
    pub fn count(&self, status: TaskStatus) -> usize {
        self.column(status).len()
    }

    /// Returns the column containing the given task id, if any.
    ///
    /// This is the drop-target resolution helper: a drop onto a sibling
    /// task resolves to whichever column holds that sibling.
    #[must_use]
    pub fn column_of(&self, id: TaskId) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| self.column(*status).iter().any(|task| task.id() == id))
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<&'a Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Review => &mut self.review,
            TaskStatus::Done => &mut self.done,
        }
    }
}

/// Filters tasks whose title, description, or any tag contains the query,
/// case-insensitively. An empty query matches everything.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.iter().collect();
    }
    tasks
        .iter()
        .filter(|task| matches_query(task, &needle))
        .collect()
}

fn matches_query(task: &Task, needle: &str) -> bool {
    if task.title().as_str().to_lowercase().contains(needle) {
        return true;
    }
    if task
        .description()
        .is_some_and(|description| description.to_lowercase().contains(needle))
    {
        return true;
    }
    task.tags()
        .iter()
        .any(|tag| tag.to_lowercase().contains(needle))
}
