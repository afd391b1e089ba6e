//! Polling change feed over the task table.
//!
//! The hosted backend pushes row-level change events; a plain `PostgreSQL`
//! deployment has no equivalent stream, so this adapter polls a table
//! fingerprint (row count plus latest update timestamp) at a fixed interval
//! and classifies the difference into insert/update/delete kinds. The
//! payload is a trigger signal only, which is all subscribers consume.

use std::time::Duration;

use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::store::BoardPgPool;
use crate::board::ports::{ChangeFeed, ChangeKind, TaskChange};

const EVENT_CAPACITY: usize = 64;

/// Change feed that polls the task table for remote mutations.
#[derive(Debug)]
pub struct PostgresChangeFeed {
    events: broadcast::Sender<TaskChange>,
    worker: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    count: i64,
    latest: Option<DateTime<Utc>>,
}

impl PostgresChangeFeed {
    /// Spawns the polling worker on the current Tokio runtime.
    #[must_use]
    pub fn spawn(pool: BoardPgPool, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let sender = events.clone();
        let worker = tokio::spawn(poll_loop(pool, interval, sender));
        Self { events, worker }
    }

    /// Stops the polling worker. Dropping the feed stops it as well.
    pub fn stop(&self) {
        self.worker.abort();
    }
}

impl Drop for PostgresChangeFeed {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

impl ChangeFeed for PostgresChangeFeed {
    fn subscribe(&self) -> broadcast::Receiver<TaskChange> {
        self.events.subscribe()
    }
}

async fn poll_loop(
    pool: BoardPgPool,
    interval: Duration,
    sender: broadcast::Sender<TaskChange>,
) {
    let mut known: Option<Fingerprint> = None;
    loop {
        tokio::time::sleep(interval).await;

        let current = match read_fingerprint(pool.clone()).await {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                tracing::warn!("change-feed fingerprint query failed: {err}");
                continue;
            }
        };

        if let Some(previous) = known
            && let Some(kind) = classify(previous, current)
        {
            // A send error only means nobody is subscribed right now.
            sender.send(TaskChange::new(kind)).ok();
        }
        known = Some(current);
    }
}

async fn read_fingerprint(
    pool: BoardPgPool,
) -> Result<Fingerprint, Box<dyn std::error::Error + Send + Sync>> {
    tokio::task::spawn_blocking(move || {
        use super::schema::tasks;

        let mut connection = pool.get()?;
        let count: i64 = tasks::table.count().get_result(&mut connection)?;
        let latest: Option<DateTime<Utc>> = tasks::table
            .select(max(tasks::updated_at))
            .first(&mut connection)?;
        Ok(Fingerprint { count, latest })
    })
    .await?
}

fn classify(previous: Fingerprint, current: Fingerprint) -> Option<ChangeKind> {
    if current.count > previous.count {
        return Some(ChangeKind::Insert);
    }
    if current.count < previous.count {
        return Some(ChangeKind::Delete);
    }
    if current.latest != previous.latest {
        return Some(ChangeKind::Update);
    }
    None
}
