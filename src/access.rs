//! Access gate: trial window and paid plan.
//!
//! The trial starts once, on first contact, and is never extended or
//! restarted; after it closes only a paid plan grants access.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

use crate::profile::{Plan, Profile};

/// Default trial length in days.
pub const DEFAULT_TRIAL_DAYS: u32 = 3;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = now;
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = guard.checked_add_signed(delta).unwrap_or(*guard);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Start the trial window if it was never started.
///
/// Returns `true` when this call started it. An existing value, even an
/// expired one, is never overwritten.
pub fn ensure_trial_started(profile: &mut Profile, now: DateTime<Utc>, trial_days: u32) -> bool {
    if profile.trial_until.is_some() {
        return false;
    }
    let length = SECONDS_PER_DAY.saturating_mul(i64::from(trial_days));
    profile.trial_until = Some(now.timestamp().saturating_add(length));
    true
}

/// Whether the participant may use the free-chat stage right now.
pub fn has_access(profile: &Profile, now: DateTime<Utc>) -> bool {
    profile.plan == Plan::Paid
        || profile
            .trial_until
            .is_some_and(|until| now.timestamp() < until)
}

/// Whole days left in the trial, never negative.
pub fn trial_days_left(profile: &Profile, now: DateTime<Utc>) -> i64 {
    profile
        .trial_until
        .and_then(|until| until.saturating_sub(now.timestamp()).max(0).checked_div(SECONDS_PER_DAY))
        .unwrap_or(0)
}
