//! Timer scheduling.
//!
//! The controller never sleeps and spawns no threads of its own. It asks a
//! [`TimerScheduler`] for single-shot timers identified by [`TimerKind`]
//! and reacts when the host reports a fire through
//! [`on_timer`](crate::controller::EngagementController::on_timer).
//!
//! Two schedulers are provided:
//!
//! - [`ManualScheduler`]: deterministic virtual clock, advanced explicitly
//!   by the host. This is what tests and one-shot hosts use.
//! - [`TokioScheduler`]: real-time, backed by `tokio::time::sleep`; fires
//!   arrive over a channel the host drains.

mod manual;
mod runtime;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

/// The four timers a controller coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Collapses a burst of progress updates into one store write.
    DebouncePersist,
    /// Hides the progress slider after inactivity.
    AutoClose,
    /// Clears the love-reaction particle effect.
    ParticleExpiry,
    /// Clears the dislike-reaction shake animation.
    ShakeExpiry,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::DebouncePersist,
        TimerKind::AutoClose,
        TimerKind::ParticleExpiry,
        TimerKind::ShakeExpiry,
    ];
}

/// Identifies one pending scheduled callback.
///
/// Handles are never reused by the provided schedulers, so a fire that
/// races a cancel can be detected by comparing handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Host capability to run a callback once after a delay.
pub trait TimerScheduler {
    /// Schedule a single-shot timer of `kind` after `delay`. The returned
    /// handle identifies the pending callback for [`cancel`](Self::cancel).
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle;

    /// Cancel a pending timer. Unknown or already-fired handles are a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Shared-scheduler handle for single-threaded hosts that pump the
/// scheduler while controllers hold it.
impl<T: TimerScheduler> TimerScheduler for Rc<RefCell<T>> {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.borrow_mut().schedule(delay, kind)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.borrow_mut().cancel(handle)
    }
}
