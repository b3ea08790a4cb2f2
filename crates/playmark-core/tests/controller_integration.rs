//! Integration tests for the engagement controller.
//!
//! These drive the controller the way a view host would: call operations,
//! pump the deterministic scheduler, and deliver fires back in.

use std::cell::RefCell;
use std::rc::Rc;

use playmark_core::{
    EngagementController, EngagementError, EngagementRecord, ItemId, ManualScheduler, MemoryStore,
    Reaction, RecordPatch, RecordStore, StoreError, StoreKey, TimerKind, Viewer, ViewerId,
};

fn key() -> StoreKey {
    StoreKey::new(ViewerId::new("v1"), ItemId::new("halcyon-6"))
}

fn signed_in() -> Viewer {
    Viewer::signed_in("v1")
}

fn item() -> Option<ItemId> {
    Some(ItemId::new("halcyon-6"))
}

/// Store wrapper that counts merge calls.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    merges: u64,
}

impl RecordStore for CountingStore {
    fn read(&self, key: &StoreKey) -> Result<Option<EngagementRecord>, StoreError> {
        self.inner.read(key)
    }

    fn merge(
        &mut self,
        key: &StoreKey,
        patch: RecordPatch,
    ) -> Result<EngagementRecord, StoreError> {
        self.merges += 1;
        self.inner.merge(key, patch)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

/// Store wrapper whose merges fail while `failing` is set.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: bool,
    attempts: u64,
}

impl RecordStore for FlakyStore {
    fn read(&self, key: &StoreKey) -> Result<Option<EngagementRecord>, StoreError> {
        self.inner.read(key)
    }

    fn merge(
        &mut self,
        key: &StoreKey,
        patch: RecordPatch,
    ) -> Result<EngagementRecord, StoreError> {
        self.attempts += 1;
        if self.failing {
            return Err(StoreError::DataDir("simulated outage".into()));
        }
        self.inner.merge(key, patch)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

#[test]
fn new_viewer_new_item_love_scenario() {
    // load -> all-zero record
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        MemoryStore::new(),
        ManualScheduler::new(),
    );
    ctl.load();
    assert_eq!(*ctl.record(), EngagementRecord::default());

    // love -> loved + particle effect
    ctl.set_reaction(Reaction::Love).unwrap();
    assert!(ctl.record().loved);
    assert!(ctl.particle_active());

    // particle expiry elapses with no further calls
    ctl.advance_timers(2000);
    assert!(!ctl.particle_active());
    assert!(ctl.record().loved);
}

#[test]
fn reaction_axis_mutual_exclusion_and_toggle() {
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        MemoryStore::new(),
        ManualScheduler::new(),
    );
    ctl.load();

    ctl.set_reaction(Reaction::Like).unwrap();
    ctl.set_reaction(Reaction::Dislike).unwrap();
    let record = ctl.record();
    assert!(record.disliked && !record.liked && !record.loved);

    // Toggling the active reaction returns to the none state.
    ctl.set_reaction(Reaction::Dislike).unwrap();
    let record = ctl.record();
    assert!(!record.liked && !record.loved && !record.disliked);
}

#[test]
fn debounce_collapses_to_one_write_with_last_value() {
    let store = Rc::new(RefCell::new(CountingStore::default()));
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        ManualScheduler::new(),
    );
    ctl.load();

    ctl.set_progress(45).unwrap();
    ctl.advance_timers(200);
    ctl.set_progress(60).unwrap();
    ctl.advance_timers(500);

    assert_eq!(store.borrow().merges, 1);
    let stored = store.borrow().read(&key()).unwrap().unwrap();
    assert_eq!(stored.play_progress, 60);
    assert!(stored.played);
}

#[test]
fn debounce_schedule_and_cancel_counts() {
    let sched = Rc::new(RefCell::new(ManualScheduler::new()));
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        MemoryStore::new(),
        Rc::clone(&sched),
    );
    ctl.load();

    let n: u8 = 5;
    for pct in 1..=n {
        ctl.set_progress(pct * 10).unwrap();
    }

    let sched_ref = sched.borrow();
    assert_eq!(
        sched_ref.scheduled_count(TimerKind::DebouncePersist),
        u64::from(n)
    );
    assert_eq!(
        sched_ref.canceled_count(TimerKind::DebouncePersist),
        u64::from(n) - 1
    );
}

#[test]
fn planning_guard_reports_current_progress() {
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        MemoryStore::new(),
        ManualScheduler::new(),
    );
    ctl.load();
    ctl.set_progress(15).unwrap();

    assert_eq!(
        ctl.set_planning(true),
        Err(EngagementError::PlanningBlocked { current: 15 })
    );
    assert!(!ctl.record().planning);
}

#[test]
fn corruption_recovery_leaves_store_clean() {
    let mut seeded = MemoryStore::new();
    seeded.insert_raw(key(), "\u{1}\u{2} not a record");
    let store = Rc::new(RefCell::new(seeded));

    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        ManualScheduler::new(),
    );
    ctl.load();

    assert_eq!(*ctl.record(), EngagementRecord::default());
    assert!(store.borrow().read(&key()).unwrap().is_none());
}

#[test]
fn failed_write_retries_once_on_next_operation() {
    let store = Rc::new(RefCell::new(FlakyStore::default()));
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        ManualScheduler::new(),
    );
    ctl.load();

    store.borrow_mut().failing = true;
    ctl.set_planning(true).unwrap();
    assert_eq!(store.borrow().attempts, 1);
    // In-memory state updated optimistically despite the failure.
    assert!(ctl.record().planning);

    // Store comes back; the next mutating operation carries the lost patch.
    store.borrow_mut().failing = false;
    ctl.set_reaction(Reaction::Like).unwrap();
    assert_eq!(store.borrow().attempts, 2);

    let stored = store.borrow().read(&key()).unwrap().unwrap();
    assert!(stored.planning);
    assert!(stored.liked);
}

#[test]
fn failed_write_is_dropped_after_second_failure() {
    let store = Rc::new(RefCell::new(FlakyStore::default()));
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        ManualScheduler::new(),
    );
    ctl.load();

    store.borrow_mut().failing = true;
    ctl.set_planning(true).unwrap();
    ctl.set_reaction(Reaction::Like).unwrap();
    assert_eq!(store.borrow().attempts, 2);

    // The planning patch had its one retry; only the reaction patch is
    // still carried when the store recovers.
    store.borrow_mut().failing = false;
    ctl.set_progress(5).unwrap();
    ctl.advance_timers(500);

    let stored = store.borrow().read(&key()).unwrap().unwrap();
    assert!(!stored.planning);
    assert!(stored.liked);
    assert_eq!(stored.play_progress, 5);
}

#[test]
fn shared_store_last_write_wins_per_key() {
    let store = Rc::new(RefCell::new(MemoryStore::new()));

    let mut first = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        ManualScheduler::new(),
    );
    first.load();
    let mut second = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        ManualScheduler::new(),
    );
    second.load();

    first.set_reaction(Reaction::Like).unwrap();
    second.set_reaction(Reaction::Love).unwrap();

    // The second instance's reaction write shipped all three flags, so it
    // wins wholesale.
    let stored = store.borrow().read(&key()).unwrap().unwrap();
    assert!(stored.loved);
    assert!(!stored.liked);
}

#[test]
fn disposal_orphans_no_write() {
    let store = Rc::new(RefCell::new(CountingStore::default()));
    let sched = Rc::new(RefCell::new(ManualScheduler::new()));
    let mut ctl = EngagementController::new(
        signed_in(),
        item(),
        Rc::clone(&store),
        Rc::clone(&sched),
    );
    ctl.load();

    ctl.set_progress(75).unwrap();
    ctl.dispose();

    let fired = sched.borrow_mut().advance(10_000);
    for (handle, kind) in fired {
        ctl.on_timer(kind, handle);
    }
    assert_eq!(store.borrow().merges, 0);
}
