//! Tests for the pure column projection and search filtering.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::collections::HashSet;

use rstest::{fixture, rstest};

use super::support::task_named;
use crate::board::domain::{
    BoardColumns, Task, TaskId, TaskPatch, TaskStatus, filter_tasks,
};

#[fixture]
fn mixed_board() -> Vec<Task> {
    vec![
        task_named("Wire the login flow", TaskStatus::Todo, 0),
        task_named("Review analytics queries", TaskStatus::Review, 1),
        task_named("Fix the export crash", TaskStatus::InProgress, 2),
        task_named("Polish empty states", TaskStatus::Todo, 3),
        task_named("Ship onboarding", TaskStatus::Done, 4),
        task_named("Document the API", TaskStatus::Todo, 5),
    ]
}

fn ids(tasks: &[&Task]) -> Vec<TaskId> {
    tasks.iter().map(|task| task.id()).collect()
}

#[rstest]
fn projection_partitions_collection_into_disjoint_columns(mixed_board: Vec<Task>) {
    let columns = BoardColumns::project(&mixed_board);

    let mut seen: HashSet<TaskId> = HashSet::new();
    let mut total = 0_usize;
    for status in TaskStatus::ALL {
        for task in columns.column(status) {
            assert_eq!(task.status(), status);
            assert!(seen.insert(task.id()), "task appears in two columns");
            total += 1;
        }
    }

    assert_eq!(total, mixed_board.len());
    let input_ids: HashSet<TaskId> = mixed_board.iter().map(Task::id).collect();
    assert_eq!(seen, input_ids);
}

#[rstest]
fn projection_preserves_collection_order_within_columns(mixed_board: Vec<Task>) {
    let columns = BoardColumns::project(&mixed_board);

    let todo_ids = ids(columns.column(TaskStatus::Todo));
    let expected: Vec<TaskId> = mixed_board
        .iter()
        .filter(|task| task.status() == TaskStatus::Todo)
        .map(Task::id)
        .collect();
    assert_eq!(todo_ids, expected);
}

#[rstest]
fn projection_counts_match_column_sizes(mixed_board: Vec<Task>) {
    let columns = BoardColumns::project(&mixed_board);

    assert_eq!(columns.count(TaskStatus::Todo), 3);
    assert_eq!(columns.count(TaskStatus::InProgress), 1);
    assert_eq!(columns.count(TaskStatus::Review), 1);
    assert_eq!(columns.count(TaskStatus::Done), 1);
}

#[rstest]
fn column_of_resolves_the_owning_column(mixed_board: Vec<Task>) {
    let columns = BoardColumns::project(&mixed_board);
    let reviewed = mixed_board
        .iter()
        .find(|task| task.status() == TaskStatus::Review)
        .expect("fixture has a review task");

    assert_eq!(columns.column_of(reviewed.id()), Some(TaskStatus::Review));
    assert_eq!(columns.column_of(TaskId::new()), None);
}

#[rstest]
fn empty_collection_projects_four_empty_columns() {
    let columns = BoardColumns::project(&[]);
    for status in TaskStatus::ALL {
        assert_eq!(columns.count(status), 0);
    }
}

#[rstest]
fn filter_matches_title_case_insensitively(mixed_board: Vec<Task>) {
    let hits = filter_tasks(&mixed_board, "EXPORT");
    assert_eq!(hits.len(), 1);
    let hit = hits.first().expect("one hit");
    assert_eq!(hit.title().as_str(), "Fix the export crash");
}

#[rstest]
fn filter_matches_description_and_tags() {
    let mut described = task_named("Plain title", TaskStatus::Todo, 0);
    described.apply_patch(
        &TaskPatch::new().with_description("tune the cache layer"),
        &mockable::DefaultClock,
    );
    let mut tagged = task_named("Another title", TaskStatus::Todo, 1);
    tagged.apply_patch(
        &TaskPatch::new().with_tags(vec!["backend".to_owned()]),
        &mockable::DefaultClock,
    );
    let tasks = vec![described, tagged];

    assert_eq!(filter_tasks(&tasks, "cache").len(), 1);
    assert_eq!(filter_tasks(&tasks, "backend").len(), 1);
    assert_eq!(filter_tasks(&tasks, "missing").len(), 0);
}

#[rstest]
fn empty_query_matches_everything(mixed_board: Vec<Task>) {
    assert_eq!(filter_tasks(&mixed_board, "  ").len(), mixed_board.len());
}
