//! `PostgreSQL`-backed implementation of the task store port.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use mockable::Clock;
use uuid::Uuid;

use super::decode::{collaborator_from_row, comment_from_row, task_from_rows};
use super::models::{
    CommentRow, NewCommentRow, NewTagRow, NewTaskRow, TagRow, TaskChangeset, TaskRow, UserRow,
};
use super::schema::{task_comments, task_tags, tasks, users};
use crate::board::{
    domain::{Comment, NewComment, NewTask, Task, TaskId, TaskPatch, TaskRank, TaskStatus},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use crate::directory::domain::UserId;
use async_trait::async_trait;

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore<C> {
    pool: BoardPgPool,
    clock: Arc<C>,
}

impl From<DieselError> for TaskStoreError {
    fn from(err: DieselError) -> Self {
        Self::backend(err)
    }
}

impl<C> PostgresTaskStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::backend)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::backend)?
    }
}

#[async_trait]
impl<C> TaskStore for PostgresTaskStore<C>
where
    C: Clock + Send + Sync,
{
    async fn fetch_all(&self) -> TaskStoreResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let task_rows = tasks::table
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::backend)?;

            let task_ids: Vec<Uuid> = task_rows.iter().map(|row| row.id).collect();
            let tag_rows = task_tags::table
                .filter(task_tags::task_id.eq_any(&task_ids))
                .order((task_tags::task_id, task_tags::position))
                .select(TagRow::as_select())
                .load::<TagRow>(connection)
                .map_err(TaskStoreError::backend)?;
            let comment_rows = task_comments::table
                .filter(task_comments::task_id.eq_any(&task_ids))
                .order(task_comments::created_at.asc())
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map_err(TaskStoreError::backend)?;

            let user_map = load_referenced_users(connection, &task_rows, &comment_rows)?;
            assemble_collection(task_rows, tag_rows, comment_rows, &user_map)
        })
        .await
    }

    async fn insert(&self, draft: NewTask) -> TaskStoreResult<Task> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            connection.transaction::<Task, TaskStoreError, _>(|inner| {
                require_user(inner, draft.creator())?;
                if let Some(assignee) = draft.assignee() {
                    require_user(inner, assignee)?;
                }

                let task_id = Uuid::new_v4();
                let new_row = NewTaskRow {
                    id: task_id,
                    title: draft.title().as_str().to_owned(),
                    description: draft.description().map(str::to_owned),
                    status: draft.status().as_str().to_owned(),
                    priority: draft.priority().as_str().to_owned(),
                    assignee_id: draft.assignee().map(UserId::into_inner),
                    creator_id: draft.creator().into_inner(),
                    due_date: draft.due_date(),
                    rank: 0,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(inner)?;

                if !draft.tags().is_empty() {
                    insert_tag_rows(inner, task_id, draft.tags())?;
                }

                load_task(inner, task_id)
            })
        })
        .await
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            connection.transaction::<Task, TaskStoreError, _>(|inner| {
                if let Some(assignee) = patch.assignee() {
                    require_user(inner, assignee)?;
                }

                let changeset = TaskChangeset {
                    title: patch.title().map(|title| title.as_str().to_owned()),
                    description: patch.description().map(str::to_owned),
                    status: patch.status().map(|status| status.as_str().to_owned()),
                    priority: patch.priority().map(|priority| priority.as_str().to_owned()),
                    assignee_id: patch.assignee().map(UserId::into_inner),
                    due_date: patch.due_date(),
                    updated_at: now,
                };
                let affected = diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                    .set(&changeset)
                    .execute(inner)?;
                if affected == 0 {
                    return Err(TaskStoreError::NotFound(id));
                }

                if let Some(tags) = patch.tags() {
                    // Full tag-set replacement: delete all, then insert.
                    diesel::delete(
                        task_tags::table.filter(task_tags::task_id.eq(id.into_inner())),
                    )
                    .execute(inner)?;
                    if !tags.is_empty() {
                        insert_tag_rows(inner, id.into_inner(), tags)?;
                    }
                }

                load_task(inner, id.into_inner())
            })
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskStoreError::backend)?;
            if affected == 0 {
                return Err(TaskStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskStoreResult<Task> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set((
                    tasks::status.eq(status.as_str()),
                    tasks::updated_at.eq(now),
                ))
                .execute(connection)
                .map_err(TaskStoreError::backend)?;
            if affected == 0 {
                return Err(TaskStoreError::NotFound(id));
            }
            load_task(connection, id.into_inner())
        })
        .await
    }

    async fn set_assignee(&self, id: TaskId, assignee: UserId) -> TaskStoreResult<Task> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            require_user(connection, assignee)?;
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set((
                    tasks::assignee_id.eq(assignee.into_inner()),
                    tasks::updated_at.eq(now),
                ))
                .execute(connection)
                .map_err(TaskStoreError::backend)?;
            if affected == 0 {
                return Err(TaskStoreError::NotFound(id));
            }
            load_task(connection, id.into_inner())
        })
        .await
    }

    async fn upsert_ranks(&self, ranks: &[TaskRank]) -> TaskStoreResult<()> {
        let entries = ranks.to_vec();
        self.run_blocking(move |connection| {
            connection.transaction::<(), TaskStoreError, _>(|inner| {
                for entry in &entries {
                    // A rank for a since-deleted task updates no row; the
                    // conflict resolution key is the task id.
                    diesel::update(
                        tasks::table.filter(tasks::id.eq(entry.task_id.into_inner())),
                    )
                    .set(tasks::rank.eq(entry.rank))
                    .execute(inner)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn insert_comment(
        &self,
        task_id: TaskId,
        draft: NewComment,
    ) -> TaskStoreResult<Comment> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            connection.transaction::<Comment, TaskStoreError, _>(|inner| {
                let author_row = users::table
                    .filter(users::id.eq(draft.author().into_inner()))
                    .select(UserRow::as_select())
                    .first::<UserRow>(inner)
                    .optional()?
                    .ok_or(TaskStoreError::UnknownUser(draft.author()))?;

                let affected =
                    diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                        .set(tasks::updated_at.eq(now))
                        .execute(inner)?;
                if affected == 0 {
                    return Err(TaskStoreError::NotFound(task_id));
                }

                let new_row = NewCommentRow {
                    id: Uuid::new_v4(),
                    task_id: task_id.into_inner(),
                    author_id: draft.author().into_inner(),
                    content: draft.content().to_owned(),
                    created_at: now,
                };
                diesel::insert_into(task_comments::table)
                    .values(&new_row)
                    .execute(inner)?;

                let mut user_map = HashMap::new();
                user_map.insert(author_row.id, author_row);
                comment_from_row(
                    CommentRow {
                        id: new_row.id,
                        task_id: new_row.task_id,
                        author_id: new_row.author_id,
                        content: new_row.content,
                        created_at: new_row.created_at,
                    },
                    &user_map,
                )
            })
        })
        .await
    }
}

fn require_user(connection: &mut PgConnection, id: UserId) -> TaskStoreResult<()> {
    let found: Option<Uuid> = users::table
        .filter(users::id.eq(id.into_inner()))
        .select(users::id)
        .first(connection)
        .optional()
        .map_err(TaskStoreError::backend)?;
    found
        .map(|_| ())
        .ok_or(TaskStoreError::UnknownUser(id))
}

fn insert_tag_rows(
    connection: &mut PgConnection,
    task_id: Uuid,
    tags: &[String],
) -> TaskStoreResult<()> {
    let rows: Vec<NewTagRow> = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| NewTagRow {
            task_id,
            tag: tag.clone(),
            position: i32::try_from(index).unwrap_or(i32::MAX),
        })
        .collect();
    diesel::insert_into(task_tags::table)
        .values(&rows)
        .execute(connection)
        .map_err(TaskStoreError::backend)?;
    Ok(())
}

fn load_referenced_users(
    connection: &mut PgConnection,
    task_rows: &[TaskRow],
    comment_rows: &[CommentRow],
) -> TaskStoreResult<HashMap<Uuid, UserRow>> {
    let mut user_ids: HashSet<Uuid> = HashSet::new();
    for row in task_rows {
        user_ids.insert(row.creator_id);
        if let Some(assignee) = row.assignee_id {
            user_ids.insert(assignee);
        }
    }
    for row in comment_rows {
        user_ids.insert(row.author_id);
    }

    let ids: Vec<Uuid> = user_ids.into_iter().collect();
    let rows = users::table
        .filter(users::id.eq_any(&ids))
        .select(UserRow::as_select())
        .load::<UserRow>(connection)
        .map_err(TaskStoreError::backend)?;
    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

fn assemble_collection(
    task_rows: Vec<TaskRow>,
    tag_rows: Vec<TagRow>,
    comment_rows: Vec<CommentRow>,
    users_by_id: &HashMap<Uuid, UserRow>,
) -> TaskStoreResult<Vec<Task>> {
    let mut tags_by_task: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in tag_rows {
        tags_by_task.entry(row.task_id).or_default().push(row.tag);
    }

    let mut comments_by_task: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for row in comment_rows {
        let owner = row.task_id;
        let comment = comment_from_row(row, users_by_id)?;
        comments_by_task.entry(owner).or_default().push(comment);
    }

    task_rows
        .into_iter()
        .map(|row| {
            let tags = tags_by_task.remove(&row.id).unwrap_or_default();
            let comments = comments_by_task.remove(&row.id).unwrap_or_default();
            task_from_rows(row, tags, comments, users_by_id)
        })
        .collect()
}

fn load_task(connection: &mut PgConnection, id: Uuid) -> TaskStoreResult<Task> {
    let row = tasks::table
        .filter(tasks::id.eq(id))
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()
        .map_err(TaskStoreError::backend)?
        .ok_or(TaskStoreError::NotFound(TaskId::from_uuid(id)))?;

    let tag_rows = task_tags::table
        .filter(task_tags::task_id.eq(id))
        .order(task_tags::position)
        .select(TagRow::as_select())
        .load::<TagRow>(connection)
        .map_err(TaskStoreError::backend)?;
    let comment_rows = task_comments::table
        .filter(task_comments::task_id.eq(id))
        .order(task_comments::created_at.asc())
        .select(CommentRow::as_select())
        .load::<CommentRow>(connection)
        .map_err(TaskStoreError::backend)?;

    let row_slice = std::slice::from_ref(&row);
    let user_map = load_referenced_users(connection, row_slice, &comment_rows)?;

    let tags = tag_rows.into_iter().map(|tag_row| tag_row.tag).collect();
    let comments = comment_rows
        .into_iter()
        .map(|comment_row| comment_from_row(comment_row, &user_map))
        .collect::<TaskStoreResult<Vec<Comment>>>()?;
    task_from_rows(row, tags, comments, &user_map)
}
