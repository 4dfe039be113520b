//! Transient price-flash state with timed expiry
//!
//! A tick lights the matching row green or red for a fixed window measured
//! from the *latest* tick. Rapid repeats therefore collapse into one extended
//! flash instead of stacking timers: the deadline map holds at most one entry
//! per coin id, and re-triggering overwrites both direction and deadline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Direction of the most recent accepted price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashDirection {
    Rising,
    Falling,
}

/// Deadline-map scheduler for per-row flash expiry.
///
/// The event loop calls [`FlashScheduler::sweep`] on its cadence and clears
/// row state for whatever expired; there is never more than one pending
/// expiry per id.
#[derive(Debug)]
pub struct FlashScheduler {
    deadlines: HashMap<String, (FlashDirection, Instant)>,
    ttl: Duration,
}

impl FlashScheduler {
    pub fn new(ttl: Duration) -> Self {
        Self {
            deadlines: HashMap::new(),
            ttl,
        }
    }

    /// Light (or re-light) a flash for `id`. Latest direction wins and the
    /// expiry deadline restarts from `now`.
    pub fn trigger(&mut self, id: &str, direction: FlashDirection, now: Instant) {
        self.deadlines
            .insert(id.to_string(), (direction, now + self.ttl));
    }

    /// Current flash direction for `id`, if one is still active.
    pub fn active(&self, id: &str) -> Option<FlashDirection> {
        self.deadlines.get(id).map(|(direction, _)| *direction)
    }

    /// Remove every flash whose deadline has passed, returning the ids so the
    /// caller can clear the corresponding row state.
    pub fn sweep(&mut self, now: Instant) -> Vec<String> {
        let expired: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.deadlines.remove(id);
        }
        expired
    }

    /// Drop all pending flashes. Used on teardown so nothing keeps mutating a
    /// store that is going away.
    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    /// Number of flashes currently pending expiry.
    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }
}
