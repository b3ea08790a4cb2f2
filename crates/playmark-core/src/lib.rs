//! # Playmark Core Library
//!
//! This library provides the engagement core of the Playmark catalog
//! client: the per-item state machine that records a viewer's reaction,
//! planning intent, and play progress, debounces writes to durable
//! storage, and drives the transient UI timers. The view layer is a thin
//! consumer of the same core.
//!
//! ## Architecture
//!
//! - **Controller**: A synchronous state machine, one instance per
//!   rendered item. Timer fires are delivered back by the host; the
//!   controller itself never blocks or spawns.
//! - **Stores**: A narrow read / merge / delete contract over
//!   `(viewer, item)` keys, with SQLite-backed and in-memory
//!   implementations. Merges are atomic per key, last-write-wins across
//!   instances.
//! - **Timers**: Single-shot, independently cancelable, one pending
//!   callback per kind. A deterministic scheduler for tests and one-shot
//!   hosts, a Tokio-backed one for real-time hosts.
//!
//! ## Key Components
//!
//! - [`EngagementController`]: Core engagement state machine
//! - [`RecordStore`]: Persistence contract ([`SqliteStore`], [`MemoryStore`])
//! - [`TimerScheduler`]: Host timer capability
//! - [`Config`]: Tuning configuration management

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod record;
pub mod store;
pub mod timer;
pub mod viewer;

pub use config::{Config, Tuning};
pub use controller::{EngagementController, EngagementSnapshot};
pub use error::{EngagementError, StoreError};
pub use events::Event;
pub use record::{EngagementRecord, Reaction, RecordPatch};
pub use store::{MemoryStore, RecordStore, SqliteStore};
pub use timer::{ManualScheduler, TimerHandle, TimerKind, TimerScheduler, TokioScheduler};
pub use viewer::{ItemId, StoreKey, Viewer, ViewerId};
