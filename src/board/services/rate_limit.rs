//! Sliding-window limiter for resynchronisation bursts.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

/// Outcome of asking the limiter for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// A slot was available; the event has been recorded.
    Allowed,
    /// The window is exhausted.
    Limited {
        /// Time until the oldest recorded event leaves the window.
        retry_after: Duration,
    },
}

/// Sliding-window rate limiter over a mockable clock.
///
/// Holds the timestamps of recent events; an event is admitted while fewer
/// than `max_events` fall inside the window, and otherwise the caller
/// learns how long until the oldest one expires.
pub struct ResyncLimiter<C> {
    clock: Arc<C>,
    max_events: usize,
    window: TimeDelta,
    timestamps: Mutex<VecDeque<DateTime<Utc>>>,
}

impl<C> ResyncLimiter<C>
where
    C: Clock,
{
    /// Creates a limiter admitting `max_events` per `window`.
    #[must_use]
    pub fn new(clock: Arc<C>, max_events: u32, window: Duration) -> Self {
        Self {
            clock,
            max_events: usize::try_from(max_events).unwrap_or(usize::MAX),
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Requests a slot, recording the event when one is available.
    #[must_use]
    pub fn check(&self) -> RateDecision {
        let now = self.clock.utc();
        let mut timestamps = self
            .timestamps
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while let Some(oldest) = timestamps.front() {
            if now.signed_duration_since(*oldest) < self.window {
                break;
            }
            timestamps.pop_front();
        }

        if timestamps.len() >= self.max_events {
            let retry_after = timestamps.front().map_or(Duration::ZERO, |oldest| {
                (self.window - now.signed_duration_since(*oldest))
                    .to_std()
                    .unwrap_or(Duration::ZERO)
            });
            return RateDecision::Limited { retry_after };
        }

        timestamps.push_back(now);
        RateDecision::Allowed
    }
}
