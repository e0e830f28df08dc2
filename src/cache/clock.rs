// Time source for expiry and sweep scheduling.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Milliseconds in one day, the unit every expiry is expressed in.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Useful for exercising expiry.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Absolute instant `days` after `now`, or `None` when `days` is not a
/// positive finite count or the instant falls outside the millisecond range.
pub fn days_from(now: i64, days: f64) -> Option<i64> {
    if !days.is_finite() || days <= 0.0 {
        return None;
    }
    let offset = (days * MILLIS_PER_DAY as f64).round();
    if offset >= i64::MAX as f64 {
        return None;
    }
    now.checked_add(offset as i64)
}
