//! In-memory record store.
//!
//! Entries hold the same JSON encoding the durable store uses, so decode
//! failures behave identically. Hosts use this for ephemeral sessions;
//! tests use [`MemoryStore::insert_raw`] to seed corrupted entries.

use std::collections::HashMap;

use super::RecordStore;
use crate::error::StoreError;
use crate::record::{EngagementRecord, RecordPatch};
use crate::viewer::StoreKey;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<StoreKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a raw value under `key`, bypassing encoding. This is how a
    /// corrupted entry is simulated.
    pub fn insert_raw(&mut self, key: StoreKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    /// The raw encoded value at `key`, if any.
    pub fn raw(&self, key: &StoreKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, key: &StoreKey) -> Result<Option<EngagementRecord>, StoreError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(encoded) => serde_json::from_str(encoded)
                .map(Some)
                .map_err(|_| StoreError::Corrupted { key: key.clone() }),
        }
    }

    fn merge(
        &mut self,
        key: &StoreKey,
        patch: RecordPatch,
    ) -> Result<EngagementRecord, StoreError> {
        let mut record = self.read(key)?.unwrap_or_default();
        record.apply(&patch);
        self.entries
            .insert(key.clone(), serde_json::to_string(&record)?);
        Ok(record)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
