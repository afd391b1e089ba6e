//! Cache and reconciliation tests for the repository service.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::unwrap_used,
    reason = "Test channels are completed before their receivers resolve"
)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use rstest::rstest;
use tokio::sync::{Mutex, oneshot};

use super::support::{MockStore, task_named, with_status};
use crate::board::{
    domain::{
        Comment, CommentId, NewComment, NewTask, Task, TaskId, TaskPatch, TaskRank, TaskStatus,
        TaskTitle,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
    services::TaskRepositoryService,
};
use crate::directory::domain::UserId;

fn backend_error() -> TaskStoreError {
    TaskStoreError::backend(std::io::Error::other("connection reset"))
}

fn service(mock: MockStore) -> TaskRepositoryService<MockStore> {
    TaskRepositoryService::new(Arc::new(mock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_replaces_collection_and_clears_loading() {
    let tasks = vec![
        task_named("newest", TaskStatus::Todo, 10),
        task_named("older", TaskStatus::Done, 0),
    ];
    let fetched = tasks.clone();
    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));

    let repository = service(mock);
    repository.refresh().await.expect("refresh should succeed");

    assert_eq!(repository.snapshot(), tasks);
    assert!(!repository.is_loading());
    assert!(repository.last_error().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_keeps_previous_collection_and_records_error() {
    let seeded = vec![task_named("survivor", TaskStatus::Todo, 0)];
    let first = seeded.clone();
    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(first.clone()));
    mock.expect_fetch_all()
        .times(1)
        .returning(|| Err(backend_error()));

    let repository = service(mock);
    repository.refresh().await.expect("first refresh succeeds");
    let result = repository.refresh().await;

    assert!(result.is_err());
    assert_eq!(repository.snapshot(), seeded);
    assert!(!repository.is_loading());
    let message = repository.last_error().expect("error recorded");
    assert!(!message.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_inserts_stored_record_at_front() {
    let existing = task_named("existing", TaskStatus::Todo, 0);
    let stored = task_named("brand new", TaskStatus::Todo, 60);
    let fetched = vec![existing.clone()];
    let inserted = stored.clone();

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_insert()
        .times(1)
        .returning(move |_| Ok(inserted.clone()));

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");

    let draft = NewTask::new(
        TaskTitle::new("brand new").expect("valid title"),
        UserId::new(),
    );
    repository.create(draft).await.expect("create succeeds");

    assert_eq!(repository.snapshot(), vec![stored, existing]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_create_adds_nothing_locally() {
    let mut mock = MockStore::new();
    mock.expect_insert().times(1).returning(|_| Err(backend_error()));

    let repository = service(mock);
    let draft = NewTask::new(
        TaskTitle::new("doomed").expect("valid title"),
        UserId::new(),
    );
    let result = repository.create(draft).await;

    assert!(result.is_err());
    assert!(repository.snapshot().is_empty());
    assert!(repository.last_error().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_locally_only_after_remote_success() {
    let keep = task_named("keep", TaskStatus::Todo, 0);
    let gone = task_named("gone", TaskStatus::Done, 1);
    let fetched = vec![keep.clone(), gone.clone()];

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_delete().times(1).returning(|_| Ok(()));

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");
    repository.delete(gone.id()).await.expect("delete succeeds");

    assert_eq!(repository.snapshot(), vec![keep]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_delete_keeps_record_and_records_error() {
    let survivor = task_named("survivor", TaskStatus::Todo, 0);
    let fetched = vec![survivor.clone()];

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_delete()
        .times(1)
        .returning(|id| Err(TaskStoreError::NotFound(id)));

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");
    let result = repository.delete(survivor.id()).await;

    assert!(result.is_err());
    assert_eq!(repository.snapshot(), vec![survivor]);
    assert!(repository.last_error().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_status_patches_only_the_fields_it_owns() {
    let cached = task_named("stable title", TaskStatus::Todo, 0);
    let mut remote = with_status(&cached, TaskStatus::InProgress);
    // Simulate unrelated remote drift the patch must not import.
    remote.apply_patch(
        &TaskPatch::new().with_description("remote-only description"),
        &mockable::DefaultClock,
    );
    let response = remote.clone();
    let fetched = vec![cached.clone()];

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_set_status()
        .times(1)
        .returning(move |_, _| Ok(response.clone()));

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");
    repository
        .set_status(cached.id(), TaskStatus::InProgress)
        .await
        .expect("status change succeeds");

    let snapshot = repository.snapshot();
    let patched = snapshot.first().expect("one task");
    assert_eq!(patched.status(), TaskStatus::InProgress);
    assert_eq!(patched.updated_at(), remote.updated_at());
    // Fields other operations own are untouched.
    assert_eq!(patched.description(), None);
    assert_eq!(patched.title().as_str(), "stable title");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_persists_index_ranks_and_replaces_cache_verbatim() {
    let task_a = task_named("A", TaskStatus::Todo, 0);
    let task_b = task_named("B", TaskStatus::Todo, 1);
    let fetched = vec![task_a.clone(), task_b.clone()];
    let captured: Arc<std::sync::Mutex<Vec<TaskRank>>> =
        Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_upsert_ranks().times(1).returning(move |ranks| {
        *sink.lock().expect("capture lock") = ranks.to_vec();
        Ok(())
    });

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");

    let reordered = vec![task_b.clone(), task_a.clone()];
    repository
        .reorder(reordered.clone())
        .await
        .expect("reorder succeeds");

    assert_eq!(repository.snapshot(), reordered);
    let ranks = captured.lock().expect("capture lock").clone();
    assert_eq!(
        ranks,
        vec![
            TaskRank {
                task_id: task_b.id(),
                rank: 0
            },
            TaskRank {
                task_id: task_a.id(),
                rank: 1
            },
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_reorder_keeps_previous_order() {
    let task_a = task_named("A", TaskStatus::Todo, 0);
    let task_b = task_named("B", TaskStatus::Todo, 1);
    let fetched = vec![task_a.clone(), task_b.clone()];

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_upsert_ranks()
        .times(1)
        .returning(|_| Err(backend_error()));

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");
    let result = repository.reorder(vec![task_b, task_a.clone()]).await;

    assert!(result.is_err());
    let snapshot = repository.snapshot();
    assert_eq!(
        snapshot.first().expect("two tasks").id(),
        task_a.id(),
        "failed reorder must not change the cached order"
    );
    assert!(repository.last_error().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_comment_appends_to_cached_task() {
    let cached = task_named("discussed", TaskStatus::Todo, 0);
    let author = super::support::creator();
    let comment = Comment::new(
        CommentId::new(),
        "ship it".to_owned(),
        author.clone(),
        cached.updated_at() + Duration::seconds(5),
    );
    let fetched = vec![cached.clone()];
    let stored = comment.clone();

    let mut mock = MockStore::new();
    mock.expect_fetch_all()
        .times(1)
        .returning(move || Ok(fetched.clone()));
    mock.expect_insert_comment()
        .times(1)
        .returning(move |_, _| Ok(stored.clone()));

    let repository = service(mock);
    repository.refresh().await.expect("refresh succeeds");
    let draft = NewComment::new("ship it", author.id()).expect("valid comment");
    repository
        .add_comment(cached.id(), draft)
        .await
        .expect("comment succeeds");

    let snapshot = repository.snapshot();
    let task = snapshot.first().expect("one task");
    assert_eq!(task.comments(), std::slice::from_ref(&comment));
    assert_eq!(task.updated_at(), comment.created_at());
}

/// Store double whose `set_status` responses resolve only when the test
/// releases them, keyed by the requested status.
struct GatedStatusStore {
    initial: Vec<Task>,
    gates: Mutex<std::collections::HashMap<TaskStatus, oneshot::Receiver<TaskStoreResult<Task>>>>,
}

#[async_trait]
impl TaskStore for GatedStatusStore {
    async fn fetch_all(&self) -> TaskStoreResult<Vec<Task>> {
        Ok(self.initial.clone())
    }

    async fn insert(&self, _draft: NewTask) -> TaskStoreResult<Task> {
        unimplemented!("not exercised by the gated test")
    }

    async fn update(&self, _id: TaskId, _patch: TaskPatch) -> TaskStoreResult<Task> {
        unimplemented!("not exercised by the gated test")
    }

    async fn delete(&self, _id: TaskId) -> TaskStoreResult<()> {
        unimplemented!("not exercised by the gated test")
    }

    async fn set_status(&self, _id: TaskId, status: TaskStatus) -> TaskStoreResult<Task> {
        let gate = self
            .gates
            .lock()
            .await
            .remove(&status)
            .expect("a gate exists for each requested status");
        gate.await.expect("gate sender completes")
    }

    async fn set_assignee(&self, _id: TaskId, _assignee: UserId) -> TaskStoreResult<Task> {
        unimplemented!("not exercised by the gated test")
    }

    async fn upsert_ranks(&self, _ranks: &[TaskRank]) -> TaskStoreResult<()> {
        unimplemented!("not exercised by the gated test")
    }

    async fn insert_comment(
        &self,
        _task_id: TaskId,
        _draft: NewComment,
    ) -> TaskStoreResult<Comment> {
        unimplemented!("not exercised by the gated test")
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn late_stale_status_response_is_discarded() {
    // Issue two status writes for the same task; let the second response
    // land first, then release the first. Only the latest issued write may
    // patch the cache.
    let cached = task_named("contended", TaskStatus::Todo, 0);
    let (early_tx, early_rx) = oneshot::channel();
    let (late_tx, late_rx) = oneshot::channel();
    let mut gates = std::collections::HashMap::new();
    gates.insert(TaskStatus::InProgress, early_rx);
    gates.insert(TaskStatus::Review, late_rx);
    let store = Arc::new(GatedStatusStore {
        initial: vec![cached.clone()],
        gates: Mutex::new(gates),
    });

    let repository = Arc::new(TaskRepositoryService::new(store));
    repository.refresh().await.expect("seeding refresh succeeds");

    let first = {
        let repository = Arc::clone(&repository);
        let id = cached.id();
        tokio::spawn(async move { repository.set_status(id, TaskStatus::InProgress).await })
    };
    // Let the first call take its sequence number and park on the gate
    // before the second one is issued.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let second = {
        let repository = Arc::clone(&repository);
        let id = cached.id();
        tokio::spawn(async move { repository.set_status(id, TaskStatus::Review).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    late_tx
        .send(Ok(with_status(&cached, TaskStatus::Review)))
        .unwrap();
    second
        .await
        .expect("task joins")
        .expect("second write succeeds");

    early_tx
        .send(Ok(with_status(&cached, TaskStatus::InProgress)))
        .unwrap();
    first
        .await
        .expect("task joins")
        .expect("first write succeeds");

    let snapshot = repository.snapshot();
    assert_eq!(
        snapshot.first().expect("one task").status(),
        TaskStatus::Review,
        "the stale in-progress response must not overwrite the newer one"
    );
}
