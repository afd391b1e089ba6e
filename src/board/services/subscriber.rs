//! Change-feed subscription keeping the cache eventually consistent.
//!
//! Remote mutations made by any actor arrive as change notifications; the
//! subscriber reacts to every event kind by refetching the full collection.
//! Consistency comes from full resync rather than incremental merge, at the
//! cost of redundant reads on high-churn collections; the resync limiter
//! bounds that cost by coalescing bursts into a single trailing resync.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::rate_limit::{RateDecision, ResyncLimiter};
use super::repository::TaskRepositoryService;
use crate::board::ports::{ChangeFeed, TaskChange, TaskStore};

/// Tuning knobs for the synchronisation loop.
///
/// Consumed by the composition root; all fields have working defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Resyncs admitted per window before coalescing kicks in.
    pub resync_max_events: u32,
    /// Length of the resync window, in seconds.
    pub resync_window_secs: u64,
    /// Change-feed poll interval for adapters that poll, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_max_events: 5,
            resync_window_secs: 10,
            poll_interval_secs: 2,
        }
    }
}

impl SyncConfig {
    /// Returns the resync window as a duration.
    #[must_use]
    pub const fn resync_window(&self) -> Duration {
        Duration::from_secs(self.resync_window_secs)
    }

    /// Returns the poll interval as a duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Feed-driven resynchronisation with an explicit lifecycle.
///
/// The subscription is owned by the application's composition root through
/// [`ChangeSubscriber::start`] and [`ChangeSubscriber::stop`], so tests can
/// construct isolated instances instead of sharing process-wide state.
/// Dropping the subscriber stops the worker.
pub struct ChangeSubscriber<S, C> {
    repository: Arc<TaskRepositoryService<S>>,
    limiter: Arc<ResyncLimiter<C>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S, C> ChangeSubscriber<S, C>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a subscriber over the given repository.
    #[must_use]
    pub fn new(
        repository: Arc<TaskRepositoryService<S>>,
        clock: Arc<C>,
        config: &SyncConfig,
    ) -> Self {
        let limiter = Arc::new(ResyncLimiter::new(
            clock,
            config.resync_max_events,
            config.resync_window(),
        ));
        Self {
            repository,
            limiter,
            worker: Mutex::new(None),
        }
    }

    /// Subscribes to the feed and spawns the resync worker.
    ///
    /// Returns `false` when the worker is already running; the existing
    /// subscription is kept in that case.
    #[must_use = "a false return means the previous subscription is still active"]
    pub fn start(&self, feed: &dyn ChangeFeed) -> bool {
        let mut worker = self.lock_worker();
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let receiver = feed.subscribe();
        let repository = Arc::clone(&self.repository);
        let limiter = Arc::clone(&self.limiter);
        *worker = Some(tokio::spawn(resync_loop(receiver, repository, limiter)));
        true
    }

    /// Stops the resync worker. Subsequent feed events are ignored until
    /// the next [`ChangeSubscriber::start`].
    pub fn stop(&self) {
        if let Some(handle) = self.lock_worker().take() {
            handle.abort();
        }
    }

    /// Returns `true` while the resync worker is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_worker()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_worker(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, C> Drop for ChangeSubscriber<S, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

async fn resync_loop<S, C>(
    mut receiver: broadcast::Receiver<TaskChange>,
    repository: Arc<TaskRepositoryService<S>>,
    limiter: Arc<ResyncLimiter<C>>,
) where
    S: TaskStore,
    C: Clock,
{
    loop {
        match receiver.recv().await {
            Ok(change) => {
                tracing::debug!(kind = %change.kind, "task change notification");
                if let RateDecision::Limited { retry_after } = limiter.check() {
                    tracing::debug!(?retry_after, "resync window exhausted, coalescing");
                    tokio::time::sleep(retry_after).await;
                    // Signals that arrived during the sleep are covered by
                    // the single trailing resync below.
                    while receiver.try_recv().is_ok() {}
                }
                if let Err(err) = repository.refresh().await {
                    tracing::warn!("resync after change notification failed: {err}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "change feed lagged, resyncing");
                if let Err(err) = repository.refresh().await {
                    tracing::warn!("resync after feed lag failed: {err}");
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
