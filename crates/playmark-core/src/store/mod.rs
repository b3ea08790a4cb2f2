//! Keyed persistence for engagement records.
//!
//! One record per [`StoreKey`]. The store contract is narrow: `read`,
//! shallow `merge`, `delete`. Merge is atomic per key; concurrent merges to
//! the same key from independent controllers are last-write-wins — the
//! store provides no cross-instance locking.

mod memory;
mod sqlite;

use std::cell::RefCell;
use std::rc::Rc;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::record::{EngagementRecord, RecordPatch};
use crate::viewer::StoreKey;

pub trait RecordStore {
    /// Read the record stored at `key`. Absence is a valid result; stored
    /// bytes that fail to decode surface as [`StoreError::Corrupted`].
    fn read(&self, key: &StoreKey) -> Result<Option<EngagementRecord>, StoreError>;

    /// Shallow-merge `patch` over the stored record (the zero record when
    /// absent) and write the result back under `key`, as one logically
    /// atomic step per key. Returns the merged record.
    fn merge(&mut self, key: &StoreKey, patch: RecordPatch)
        -> Result<EngagementRecord, StoreError>;

    /// Remove the entry at `key`. Removing an absent entry is a no-op.
    fn delete(&mut self, key: &StoreKey) -> Result<(), StoreError>;
}

/// Shared-store handle: every controller on a page holds the same store.
/// The scheduling model is single-threaded cooperative, so `Rc<RefCell<_>>`
/// is the sharing primitive.
impl<S: RecordStore> RecordStore for Rc<RefCell<S>> {
    fn read(&self, key: &StoreKey) -> Result<Option<EngagementRecord>, StoreError> {
        self.borrow().read(key)
    }

    fn merge(
        &mut self,
        key: &StoreKey,
        patch: RecordPatch,
    ) -> Result<EngagementRecord, StoreError> {
        self.borrow_mut().merge(key, patch)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        self.borrow_mut().delete(key)
    }
}
