//! Domain-focused tests for task types and validated scalars.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use chrono::Duration;
use rstest::rstest;

use super::support::{creator, task_named};
use crate::board::domain::{
    BoardDomainError, Collaborator, Comment, CommentId, NewComment, NewTask, ParsePriorityError,
    ParseTaskStatusError, Priority, TaskPatch, TaskStatus, TaskTitle,
};
use crate::directory::domain::UserId;

#[rstest]
#[case("todo", TaskStatus::Todo)]
#[case("in_progress", TaskStatus::InProgress)]
#[case("review", TaskStatus::Review)]
#[case("done", TaskStatus::Done)]
fn task_status_round_trips_storage_form(#[case] raw: &str, #[case] expected: TaskStatus) {
    let parsed = TaskStatus::try_from(raw).expect("valid status");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.as_str(), raw);
}

#[rstest]
fn task_status_rejects_unknown_values() {
    let result = TaskStatus::try_from("archived");
    assert_eq!(result, Err(ParseTaskStatusError("archived".to_owned())));
}

#[rstest]
fn task_status_normalises_case_and_whitespace() {
    let parsed = TaskStatus::try_from("  In_Progress ").expect("valid status");
    assert_eq!(parsed, TaskStatus::InProgress);
}

#[rstest]
#[case("low", Priority::Low)]
#[case("medium", Priority::Medium)]
#[case("high", Priority::High)]
fn priority_round_trips_storage_form(#[case] raw: &str, #[case] expected: Priority) {
    let parsed = Priority::try_from(raw).expect("valid priority");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.as_str(), raw);
}

#[rstest]
fn priority_rejects_unknown_values() {
    let result = Priority::try_from("urgent");
    assert_eq!(result, Err(ParsePriorityError("urgent".to_owned())));
}

#[rstest]
fn task_title_trims_surrounding_whitespace() {
    let title = TaskTitle::new("  Ship the board  ").expect("valid title");
    assert_eq!(title.as_str(), "Ship the board");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn task_title_rejects_blank_values(#[case] raw: &str) {
    assert_eq!(TaskTitle::new(raw), Err(BoardDomainError::EmptyTaskTitle));
}

#[rstest]
fn new_task_defaults_to_todo_and_medium_priority() {
    let title = TaskTitle::new("Draft release notes").expect("valid title");
    let draft = NewTask::new(title, UserId::new());

    assert_eq!(draft.status(), TaskStatus::Todo);
    assert_eq!(draft.priority(), Priority::Medium);
    assert!(draft.assignee().is_none());
    assert!(draft.tags().is_empty());
}

#[rstest]
fn new_comment_rejects_blank_content() {
    let result = NewComment::new("   ", UserId::new());
    assert_eq!(result, Err(BoardDomainError::EmptyCommentContent));
}

#[rstest]
fn apply_patch_leaves_absent_fields_untouched() {
    let mut task = task_named("Original", TaskStatus::Todo, 0);
    let before_priority = task.priority();
    let patch = TaskPatch::new().with_description("now with context");

    task.apply_patch(&patch, &mockable::DefaultClock);

    assert_eq!(task.title().as_str(), "Original");
    assert_eq!(task.description(), Some("now with context"));
    assert_eq!(task.priority(), before_priority);
    assert_eq!(task.status(), TaskStatus::Todo);
}

#[rstest]
fn apply_patch_replaces_tag_set_wholesale() {
    let mut task = task_named("Tagged", TaskStatus::Todo, 0);
    let first = TaskPatch::new().with_tags(vec!["infra".to_owned(), "infra".to_owned()]);
    task.apply_patch(&first, &mockable::DefaultClock);
    assert_eq!(task.tags(), ["infra", "infra"]);

    let second = TaskPatch::new().with_tags(vec!["release".to_owned()]);
    task.apply_patch(&second, &mockable::DefaultClock);
    assert_eq!(task.tags(), ["release"]);
}

#[rstest]
fn patch_status_touches_only_owned_fields() {
    let mut task = task_named("Stable", TaskStatus::Todo, 0);
    let original_title = task.title().clone();
    let stamped = task.updated_at() + Duration::seconds(30);

    task.patch_status(TaskStatus::Review, stamped);

    assert_eq!(task.status(), TaskStatus::Review);
    assert_eq!(task.updated_at(), stamped);
    assert_eq!(task.title(), &original_title);
}

#[rstest]
fn append_comment_advances_update_timestamp() {
    let mut task = task_named("Discussed", TaskStatus::Todo, 0);
    let stamped = task.updated_at() + Duration::seconds(45);
    let comment = Comment::new(
        CommentId::new(),
        "looks good".to_owned(),
        creator(),
        stamped,
    );

    task.append_comment(comment.clone());

    assert_eq!(task.comments(), [comment]);
    assert_eq!(task.updated_at(), stamped);
}

#[rstest]
fn collaborator_from_row_falls_back_to_email_local_part() {
    let named = Collaborator::from_row(
        UserId::new(),
        Some("Jane Smith".to_owned()),
        "jane@example.com".to_owned(),
    );
    assert_eq!(named.name(), "Jane Smith");

    let unnamed = Collaborator::from_row(UserId::new(), None, "jane@example.com".to_owned());
    assert_eq!(unnamed.name(), "jane");
}
