//! Deterministic scheduler driven by an explicit virtual clock.
//!
//! The host advances time with [`ManualScheduler::advance`] and delivers the
//! returned fires to the controller. No wall clock, no threads, so timer
//! behavior is exactly reproducible.

use std::collections::HashMap;
use std::time::Duration;

use super::{TimerHandle, TimerKind, TimerScheduler};

#[derive(Debug, Clone)]
struct Pending {
    handle: TimerHandle,
    kind: TimerKind,
    due_ms: u64,
}

/// Virtual-clock scheduler.
///
/// Also counts `schedule` and `cancel` calls per kind, which is how tests
/// observe cancel-then-reschedule behavior.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<Pending>,
    scheduled: HashMap<TimerKind, u64>,
    canceled: HashMap<TimerKind, u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance the clock by `ms` and return every timer that came due, in
    /// deadline order. The caller delivers each fire to its controller.
    pub fn advance(&mut self, ms: u64) -> Vec<(TimerHandle, TimerKind)> {
        self.now_ms += ms;
        let now = self.now_ms;
        let mut due: Vec<Pending> = self
            .pending
            .iter()
            .filter(|t| t.due_ms <= now)
            .cloned()
            .collect();
        self.pending.retain(|t| t.due_ms > now);
        due.sort_by_key(|t| (t.due_ms, t.handle.0));
        due.into_iter().map(|t| (t.handle, t.kind)).collect()
    }

    /// Number of timers currently pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// How many times `schedule` was called for `kind`.
    pub fn scheduled_count(&self, kind: TimerKind) -> u64 {
        self.scheduled.get(&kind).copied().unwrap_or(0)
    }

    /// How many times `cancel` was called for a pending timer of `kind`.
    pub fn canceled_count(&self, kind: TimerKind) -> u64 {
        self.canceled.get(&kind).copied().unwrap_or(0)
    }
}

impl TimerScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(Pending {
            handle,
            kind,
            due_ms: self.now_ms + delay.as_millis() as u64,
        });
        *self.scheduled.entry(kind).or_insert(0) += 1;
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let before = self.pending.len();
        let mut kind = None;
        self.pending.retain(|t| {
            if t.handle == handle {
                kind = Some(t.kind);
                false
            } else {
                true
            }
        });
        if self.pending.len() < before {
            if let Some(kind) = kind {
                *self.canceled.entry(kind).or_insert(0) += 1;
            }
        }
    }
}
