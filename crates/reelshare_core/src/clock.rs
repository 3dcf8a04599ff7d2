//! Logical time sources for record stamps.
//!
//! # Responsibility
//! - Supply `createdAt`/`updatedAt` values to the store.
//! - Keep readings non-decreasing within one clock instance.
//!
//! # Invariants
//! - Consecutive `now()` calls on the same clock never go backwards.

use crate::model::Timestamp;
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of logical timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current logical time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in nanoseconds since the Unix epoch.
///
/// Readings are clamped to the highest value handed out so far, so a
/// system clock step backwards never produces a decreasing stamp.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}

/// Controllable clock for deterministic tests.
///
/// Returns the same value until advanced or set.
#[derive(Debug, Default)]
pub struct ManualClock {
    current: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: AtomicI64::new(start),
        }
    }

    /// Moves the clock forward by `delta` and returns the new reading.
    pub fn advance(&self, delta: Timestamp) -> Timestamp {
        self.current.fetch_add(delta, Ordering::SeqCst) + delta
    }

    /// Sets the clock to an arbitrary value, including an earlier one.
    pub fn set(&self, value: Timestamp) {
        self.current.store(value, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.current.load(Ordering::SeqCst)
    }
}
