//! Thread-safe in-memory implementation of the store and feed ports.
//!
//! The store assigns identity and timestamps the way the hosted backend
//! does, resolves collaborators through the directory port, and emits a
//! change event after every successful mutation so the synchronisation loop
//! can be exercised end to end without a database.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::board::{
    domain::{
        Collaborator, Comment, CommentId, NewComment, NewTask, PersistedTask, Task, TaskId,
        TaskPatch, TaskRank, TaskStatus,
    },
    ports::{ChangeFeed, ChangeKind, TaskChange, TaskStore, TaskStoreError, TaskStoreResult},
};
use crate::directory::{domain::UserId, ports::UserDirectory};

const EVENT_CAPACITY: usize = 64;

/// In-memory task store that doubles as its own change feed.
#[derive(Clone)]
pub struct InMemoryTaskStore<C> {
    state: Arc<RwLock<MemoryState>>,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<C>,
    events: broadcast::Sender<TaskChange>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    ranks: HashMap<TaskId, i64>,
}

impl<C> InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store resolving users through the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>, clock: Arc<C>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            directory,
            clock,
            events,
        }
    }

    /// Returns the persisted rank for a task, if one has been written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Backend`] when the state lock is poisoned.
    pub fn rank_of(&self, id: TaskId) -> TaskStoreResult<Option<i64>> {
        let state = read_state(&self.state)?;
        Ok(state.ranks.get(&id).copied())
    }

    async fn resolve(&self, id: UserId) -> TaskStoreResult<Collaborator> {
        let profile = self
            .directory
            .find(id)
            .await
            .map_err(TaskStoreError::backend)?
            .ok_or(TaskStoreError::UnknownUser(id))?;
        Ok(Collaborator::from_profile(&profile))
    }

    fn emit(&self, kind: ChangeKind) {
        // A send error only means nobody is subscribed right now.
        self.events.send(TaskChange::new(kind)).ok();
    }
}

fn read_state(
    state: &Arc<RwLock<MemoryState>>,
) -> TaskStoreResult<std::sync::RwLockReadGuard<'_, MemoryState>> {
    state
        .read()
        .map_err(|err| TaskStoreError::backend(std::io::Error::other(err.to_string())))
}

fn write_state(
    state: &Arc<RwLock<MemoryState>>,
) -> TaskStoreResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
    state
        .write()
        .map_err(|err| TaskStoreError::backend(std::io::Error::other(err.to_string())))
}

fn find_task_mut(state: &mut MemoryState, id: TaskId) -> TaskStoreResult<&mut Task> {
    state
        .tasks
        .iter_mut()
        .find(|task| task.id() == id)
        .ok_or(TaskStoreError::NotFound(id))
}

#[async_trait]
impl<C> TaskStore for InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    async fn fetch_all(&self) -> TaskStoreResult<Vec<Task>> {
        let state = read_state(&self.state)?;
        let mut tasks = state.tasks.clone();
        // Stable sort keeps insertion order for equal timestamps.
        tasks.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(tasks)
    }

    async fn insert(&self, draft: NewTask) -> TaskStoreResult<Task> {
        let creator = self.resolve(draft.creator()).await?;
        let assignee = match draft.assignee() {
            Some(id) => Some(self.resolve(id).await?),
            None => None,
        };

        let now = self.clock.utc();
        let task = Task::from_persisted(PersistedTask {
            id: TaskId::new(),
            title: draft.title().clone(),
            description: draft.description().map(str::to_owned),
            status: draft.status(),
            priority: draft.priority(),
            due_date: draft.due_date(),
            created_at: now,
            updated_at: now,
            tags: draft.tags().to_vec(),
            attachments: Vec::new(),
            comments: Vec::new(),
            assignee,
            creator,
        });

        {
            let mut state = write_state(&self.state)?;
            state.tasks.push(task.clone());
        }
        self.emit(ChangeKind::Insert);
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task> {
        let assignee = match patch.assignee() {
            Some(user) => Some(self.resolve(user).await?),
            None => None,
        };

        let updated = {
            let mut state = write_state(&self.state)?;
            let task = find_task_mut(&mut state, id)?;
            task.apply_patch(&patch, &*self.clock);
            if let Some(collaborator) = assignee {
                task.set_assignee(Some(collaborator), &*self.clock);
            }
            task.clone()
        };
        self.emit(ChangeKind::Update);
        Ok(updated)
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        {
            let mut state = write_state(&self.state)?;
            let before = state.tasks.len();
            state.tasks.retain(|task| task.id() != id);
            if state.tasks.len() == before {
                return Err(TaskStoreError::NotFound(id));
            }
            state.ranks.remove(&id);
        }
        self.emit(ChangeKind::Delete);
        Ok(())
    }

    async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskStoreResult<Task> {
        let updated = {
            let mut state = write_state(&self.state)?;
            let task = find_task_mut(&mut state, id)?;
            task.set_status(status, &*self.clock);
            task.clone()
        };
        self.emit(ChangeKind::Update);
        Ok(updated)
    }

    async fn set_assignee(&self, id: TaskId, assignee: UserId) -> TaskStoreResult<Task> {
        let collaborator = self.resolve(assignee).await?;
        let updated = {
            let mut state = write_state(&self.state)?;
            let task = find_task_mut(&mut state, id)?;
            task.set_assignee(Some(collaborator), &*self.clock);
            task.clone()
        };
        self.emit(ChangeKind::Update);
        Ok(updated)
    }

    async fn upsert_ranks(&self, ranks: &[TaskRank]) -> TaskStoreResult<()> {
        {
            let mut state = write_state(&self.state)?;
            for entry in ranks {
                state.ranks.insert(entry.task_id, entry.rank);
            }
        }
        self.emit(ChangeKind::Update);
        Ok(())
    }

    async fn insert_comment(
        &self,
        task_id: TaskId,
        draft: NewComment,
    ) -> TaskStoreResult<Comment> {
        let author = self.resolve(draft.author()).await?;
        let comment = Comment::new(
            CommentId::new(),
            draft.content().to_owned(),
            author,
            self.clock.utc(),
        );

        {
            let mut state = write_state(&self.state)?;
            let task = find_task_mut(&mut state, task_id)?;
            task.push_comment(comment.clone(), &*self.clock);
        }
        self.emit(ChangeKind::Update);
        Ok(comment)
    }
}

impl<C> ChangeFeed for InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    fn subscribe(&self) -> broadcast::Receiver<TaskChange> {
        self.events.subscribe()
    }
}
