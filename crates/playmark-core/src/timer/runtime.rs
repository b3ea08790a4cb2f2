//! Real-time scheduler backed by the Tokio runtime.
//!
//! Each scheduled timer is a spawned task that sleeps and then sends its
//! `(handle, kind)` pair over an unbounded channel. The host drains the
//! receiver and delivers each fire to the owning controller; cancel aborts
//! the sleeping task.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::{TimerHandle, TimerKind, TimerScheduler};

pub struct TokioScheduler {
    tx: UnboundedSender<(TimerHandle, TimerKind)>,
    tasks: HashMap<u64, JoinHandle<()>>,
    next_handle: u64,
}

impl TokioScheduler {
    /// Create a scheduler and the fire channel the host drains.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> (Self, UnboundedReceiver<(TimerHandle, TimerKind)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                tasks: HashMap::new(),
                next_handle: 0,
            },
            rx,
        )
    }
}

impl TimerScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        // Drop bookkeeping for tasks that already fired.
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send((handle, kind));
        });
        self.tasks.insert(handle.0, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle.0) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
