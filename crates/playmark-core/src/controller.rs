//! Engagement controller.
//!
//! One controller per rendered catalog item. It owns the item's
//! [`EngagementRecord`], enforces the record invariants, and coordinates
//! four independent single-shot timers:
//!
//! - **debounce-persist**: collapses a burst of progress updates into one
//!   store write carrying only the last value
//! - **auto-close**: hides the progress slider after inactivity
//! - **particle-expiry** / **shake-expiry**: clear the transient reaction
//!   effects
//!
//! Operations execute synchronously to completion; the only suspension
//! points are timer fires, which the host delivers back through
//! [`EngagementController::on_timer`]. Each timer kind has at most one
//! pending callback at any time: scheduling always cancels the previous
//! handle first, and a fire whose handle does not match the pending one is
//! stale and ignored.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Tuning;
use crate::error::{EngagementError, StoreError};
use crate::events::Event;
use crate::record::{EngagementRecord, Reaction, RecordPatch};
use crate::store::RecordStore;
use crate::timer::{ManualScheduler, TimerHandle, TimerKind, TimerScheduler};
use crate::viewer::{ItemId, StoreKey, Viewer};

/// Pending timer handles, one slot per kind.
#[derive(Debug, Default)]
struct TimerSlots {
    debounce: Option<TimerHandle>,
    auto_close: Option<TimerHandle>,
    particle: Option<TimerHandle>,
    shake: Option<TimerHandle>,
}

impl TimerSlots {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::DebouncePersist => &mut self.debounce,
            TimerKind::AutoClose => &mut self.auto_close,
            TimerKind::ParticleExpiry => &mut self.particle,
            TimerKind::ShakeExpiry => &mut self.shake,
        }
    }
}

/// Everything the view needs to render, readable synchronously after every
/// operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub record: EngagementRecord,
    pub slider_visible: bool,
    pub particle_active: bool,
    pub shake_active: bool,
}

pub struct EngagementController<S, T> {
    viewer: Viewer,
    item: Option<ItemId>,
    store: S,
    scheduler: T,
    tuning: Tuning,
    record: EngagementRecord,
    slider_visible: bool,
    particle_active: bool,
    shake_active: bool,
    /// While the pointer hovers the slider region the auto-close timer is
    /// suspended entirely.
    slider_hovered: bool,
    timers: TimerSlots,
    /// Patch whose write failed, kept for exactly one retry on the next
    /// mutating operation.
    carry: Option<RecordPatch>,
    events: Vec<Event>,
    disposed: bool,
}

impl<S: RecordStore, T: TimerScheduler> EngagementController<S, T> {
    /// Create a controller for `item` as seen by `viewer`.
    ///
    /// `item` is `None` while the host has not yet identified the item;
    /// the controller then never touches the store.
    pub fn new(viewer: Viewer, item: Option<ItemId>, store: S, scheduler: T) -> Self {
        Self {
            viewer,
            item,
            store,
            scheduler,
            tuning: Tuning::default(),
            record: EngagementRecord::default(),
            slider_visible: false,
            particle_active: false,
            shake_active: false,
            slider_hovered: false,
            timers: TimerSlots::default(),
            carry: None,
            events: Vec::new(),
            disposed: false,
        }
    }

    /// Override the default delays and thresholds.
    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn item(&self) -> Option<&ItemId> {
        self.item.as_ref()
    }

    pub fn record(&self) -> &EngagementRecord {
        &self.record
    }

    pub fn slider_visible(&self) -> bool {
        self.slider_visible
    }

    pub fn particle_active(&self) -> bool {
        self.particle_active
    }

    pub fn shake_active(&self) -> bool {
        self.shake_active
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn snapshot(&self) -> EngagementSnapshot {
        EngagementSnapshot {
            record: self.record,
            slider_visible: self.slider_visible,
            particle_active: self.particle_active,
            shake_active: self.shake_active,
        }
    }

    /// Drain the accumulated event log.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Host access to the scheduler, for pumping fires back in.
    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Host access to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Initialize the record from the store.
    ///
    /// Anonymous viewers and not-yet-identified items get the zero record
    /// with no store access. A stored value that fails to decode is
    /// deleted, logged, and replaced with the zero record so the
    /// corruption is not retried on every load. Never raises.
    pub fn load(&mut self) {
        let Some(key) = self.key() else {
            self.record = EngagementRecord::default();
            return;
        };
        self.record = match self.store.read(&key) {
            Ok(Some(record)) => record,
            Ok(None) => EngagementRecord::default(),
            Err(StoreError::Corrupted { .. }) => {
                warn!(%key, "discarding corrupted engagement record");
                if let Err(e) = self.store.delete(&key) {
                    warn!(%key, error = %e, "failed to delete corrupted record");
                }
                self.events.push(Event::RecordRecovered { key, at: Utc::now() });
                EngagementRecord::default()
            }
            Err(e) => {
                warn!(%key, error = %e, "store read failed; starting from defaults");
                EngagementRecord::default()
            }
        };
    }

    /// Toggle a reaction.
    ///
    /// If `kind` is already active it is cleared; otherwise it becomes
    /// active and the other two flags drop. Reaction writes are immediate,
    /// not debounced. Love starts the particle effect; dislike starts the
    /// shake animation.
    pub fn set_reaction(&mut self, kind: Reaction) -> Result<(), EngagementError> {
        self.require_signed_in()?;
        let now_active = self.record.toggle_reaction(kind);
        let at = Utc::now();
        if now_active {
            self.events.push(Event::ReactionSet { reaction: kind, at });
        } else {
            self.events.push(Event::ReactionCleared { reaction: kind, at });
        }

        match (kind, now_active) {
            (Reaction::Love, true) => {
                self.particle_active = true;
                self.reschedule(TimerKind::ParticleExpiry, self.tuning.particle());
                self.events.push(Event::ParticleBurst { at });
            }
            (Reaction::Dislike, true) => {
                self.shake_active = true;
                self.reschedule(TimerKind::ShakeExpiry, self.tuning.shake());
                self.events.push(Event::ShakeStarted { at });
            }
            _ => {}
        }

        self.persist(RecordPatch::reactions(&self.record));
        Ok(())
    }

    /// Set or clear planning intent.
    ///
    /// Enabling planning is rejected with `PlanningBlocked` once play
    /// progress has passed the lock threshold; no state changes then.
    pub fn set_planning(&mut self, planning: bool) -> Result<(), EngagementError> {
        self.require_signed_in()?;
        if planning && !self.record.planning && self.record.play_progress > self.tuning.planning_lock_pct
        {
            return Err(EngagementError::PlanningBlocked {
                current: self.record.play_progress,
            });
        }
        self.record.planning = planning;
        self.events.push(Event::PlanningChanged {
            planning,
            at: Utc::now(),
        });
        self.persist(RecordPatch::planning(planning));
        Ok(())
    }

    /// Record play progress.
    ///
    /// The in-memory record updates immediately so observers see the new
    /// value; persistence waits for the debounce window, and only the last
    /// value in a burst is written. Also counts as slider interaction.
    pub fn set_progress(&mut self, percent: u8) -> Result<(), EngagementError> {
        self.require_signed_in()?;
        self.record.set_progress(percent);
        self.events.push(Event::ProgressChanged {
            percent: self.record.play_progress,
            at: Utc::now(),
        });
        self.reschedule(TimerKind::DebouncePersist, self.tuning.debounce());
        self.reset_auto_close();
        Ok(())
    }

    /// Mark the item as being played.
    ///
    /// The first call flips `played`, opens the progress slider, and arms
    /// the auto-close timer. Subsequent calls toggle the slider.
    pub fn start_play(&mut self) -> Result<(), EngagementError> {
        self.require_signed_in()?;
        let at = Utc::now();
        if !self.record.played {
            self.record.played = true;
            self.show_slider(at);
        } else if self.slider_visible {
            self.hide_slider(false, at);
        } else {
            self.show_slider(at);
        }
        Ok(())
    }

    /// A drag, pointer-down, or pointer-up on the slider region: the
    /// viewer is still interacting, so the auto-close countdown restarts.
    pub fn slider_interacted(&mut self) {
        if !self.slider_visible || self.slider_hovered {
            return;
        }
        self.reschedule(TimerKind::AutoClose, self.tuning.auto_close());
    }

    /// Pointer entered the slider region: suspend auto-close entirely
    /// until the pointer leaves.
    pub fn slider_hover_enter(&mut self) {
        if !self.slider_visible {
            return;
        }
        self.slider_hovered = true;
        self.cancel_slot(TimerKind::AutoClose);
    }

    /// Pointer left the slider region: resume the auto-close countdown.
    pub fn slider_hover_leave(&mut self) {
        if !self.slider_hovered {
            return;
        }
        self.slider_hovered = false;
        if self.slider_visible {
            self.reschedule(TimerKind::AutoClose, self.tuning.auto_close());
        }
    }

    /// Cancel all pending timers. After disposal the controller ignores
    /// timer fires; no orphaned callback can mutate state or write to the
    /// store on its behalf.
    pub fn dispose(&mut self) {
        for kind in TimerKind::ALL {
            self.cancel_slot(kind);
        }
        self.disposed = true;
    }

    // ── Timer delivery ───────────────────────────────────────────────

    /// Deliver a fired timer.
    ///
    /// The handle must match the currently pending timer of `kind`;
    /// anything else is a stale fire (canceled or superseded) and ignored.
    pub fn on_timer(&mut self, kind: TimerKind, handle: TimerHandle) {
        if self.disposed {
            return;
        }
        let slot = self.timers.slot(kind);
        if *slot != Some(handle) {
            debug!(?kind, "ignoring stale timer fire");
            return;
        }
        *slot = None;

        let at = Utc::now();
        match kind {
            TimerKind::DebouncePersist => {
                let percent = self.record.play_progress;
                let played = self.record.played;
                if self.persist(RecordPatch::progress(percent, played)) {
                    self.events.push(Event::ProgressPersisted { percent, at });
                }
            }
            TimerKind::AutoClose => {
                self.hide_slider(true, at);
            }
            TimerKind::ParticleExpiry => {
                self.particle_active = false;
                self.events.push(Event::ParticleExpired { at });
            }
            TimerKind::ShakeExpiry => {
                self.shake_active = false;
                self.events.push(Event::ShakeEnded { at });
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn key(&self) -> Option<StoreKey> {
        let viewer = self.viewer.id()?;
        let item = self.item.as_ref()?;
        Some(StoreKey::new(viewer.clone(), item.clone()))
    }

    fn require_signed_in(&self) -> Result<(), EngagementError> {
        if self.viewer.is_signed_in() {
            Ok(())
        } else {
            Err(EngagementError::Unauthenticated)
        }
    }

    fn show_slider(&mut self, at: chrono::DateTime<Utc>) {
        self.slider_visible = true;
        self.events.push(Event::SliderOpened { at });
        self.reschedule(TimerKind::AutoClose, self.tuning.auto_close());
    }

    fn hide_slider(&mut self, auto: bool, at: chrono::DateTime<Utc>) {
        self.slider_visible = false;
        self.slider_hovered = false;
        self.cancel_slot(TimerKind::AutoClose);
        self.events.push(Event::SliderClosed { auto, at });
    }

    fn reset_auto_close(&mut self) {
        if !self.slider_visible || self.slider_hovered {
            return;
        }
        self.reschedule(TimerKind::AutoClose, self.tuning.auto_close());
    }

    /// Cancel-then-schedule: at most one pending timer per kind.
    fn reschedule(&mut self, kind: TimerKind, delay: Duration) {
        self.cancel_slot(kind);
        let handle = self.scheduler.schedule(delay, kind);
        *self.timers.slot(kind) = Some(handle);
    }

    fn cancel_slot(&mut self, kind: TimerKind) {
        if let Some(handle) = self.timers.slot(kind).take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Merge `patch` into the store, folding in a patch carried from a
    /// previous failed write. A failing patch is kept for exactly one
    /// retry on the next write; a second failure drops it. In-memory state
    /// is already updated either way.
    fn persist(&mut self, patch: RecordPatch) -> bool {
        let Some(key) = self.key() else {
            debug!("no store key yet; skipping write");
            return false;
        };
        let attempt = match self.carry.take() {
            Some(prev) => prev.overlaid(patch),
            None => patch,
        };
        match self.store.merge(&key, attempt) {
            Ok(_) => true,
            Err(e) => {
                warn!(%key, error = %e, "engagement write failed; will retry once");
                self.carry = Some(patch);
                false
            }
        }
    }
}

impl<S: RecordStore> EngagementController<S, ManualScheduler> {
    /// Advance the manual scheduler and deliver every fire back into the
    /// controller. Convenience for tests and one-shot hosts.
    pub fn advance_timers(&mut self, ms: u64) {
        let fired = self.scheduler.advance(ms);
        for (handle, kind) in fired {
            self.on_timer(kind, handle);
        }
    }
}
