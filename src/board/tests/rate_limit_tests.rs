//! Sliding-window behaviour of the resync limiter.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use rstest::rstest;

use super::support::base_time;
use crate::board::services::{RateDecision, ResyncLimiter};

/// Manually advanced clock for deterministic window tests.
struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

#[rstest]
fn events_within_the_limit_are_allowed() {
    let clock = Arc::new(SteppingClock::new(base_time()));
    let limiter = ResyncLimiter::new(Arc::clone(&clock), 3, Duration::from_secs(10));

    for _ in 0..3 {
        assert_eq!(limiter.check(), RateDecision::Allowed);
        clock.advance(TimeDelta::seconds(1));
    }
}

#[rstest]
fn saturated_window_reports_retry_after_from_oldest_event() {
    let clock = Arc::new(SteppingClock::new(base_time()));
    let limiter = ResyncLimiter::new(Arc::clone(&clock), 2, Duration::from_secs(10));

    assert_eq!(limiter.check(), RateDecision::Allowed);
    clock.advance(TimeDelta::seconds(4));
    assert_eq!(limiter.check(), RateDecision::Allowed);

    let decision = limiter.check();
    // The oldest event is 4s old; the window frees in 6s.
    assert_eq!(
        decision,
        RateDecision::Limited {
            retry_after: Duration::from_secs(6)
        }
    );
}

#[rstest]
fn expired_events_leave_the_window() {
    let clock = Arc::new(SteppingClock::new(base_time()));
    let limiter = ResyncLimiter::new(Arc::clone(&clock), 1, Duration::from_secs(10));

    assert_eq!(limiter.check(), RateDecision::Allowed);
    assert!(matches!(limiter.check(), RateDecision::Limited { .. }));

    clock.advance(TimeDelta::seconds(10));
    assert_eq!(limiter.check(), RateDecision::Allowed);
}
