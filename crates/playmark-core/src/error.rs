//! Core error types for playmark-core.
//!
//! Operations never fail fatally: controller errors are rejection signals
//! the view surfaces to the user, and store failures on the write path are
//! logged and swallowed (the in-memory state stays updated).

use std::path::PathBuf;

use thiserror::Error;

use crate::viewer::StoreKey;

/// Rejection signals returned by controller operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementError {
    /// A mutating operation was attempted with an anonymous viewer.
    /// The caller is expected to redirect to sign-in; no state changed.
    #[error("viewer is not signed in")]
    Unauthenticated,

    /// Planning cannot be enabled once play progress has passed the lock
    /// threshold. Carries the current progress for user-facing messaging.
    #[error("planning is locked at {current}% play progress")]
    PlanningBlocked { current: u8 },
}

/// Store-layer errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database.
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed.
    #[error("store query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// The stored bytes at `key` do not decode as a record. Recovered
    /// during `load` by deleting the entry and substituting the default.
    #[error("corrupted record at {key}")]
    Corrupted { key: StoreKey },

    /// A record could not be encoded for storage.
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// The data directory could not be resolved or created.
    #[error("failed to access data directory: {0}")]
    DataDir(String),
}

impl StoreError {
    pub fn is_corrupted(&self) -> bool {
        matches!(self, StoreError::Corrupted { .. })
    }
}

/// Result type alias for controller operations.
pub type Result<T, E = EngagementError> = std::result::Result<T, E>;
