//! Observable state changes.
//!
//! Every externally visible state change in the controller appends an
//! [`Event`]. The view host drains them with
//! [`take_events`](crate::controller::EngagementController::take_events)
//! after each operation or timer delivery; the current state itself is
//! always readable synchronously, so events are a change log, not the
//! source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Reaction;
use crate::viewer::StoreKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ReactionSet {
        reaction: Reaction,
        at: DateTime<Utc>,
    },
    ReactionCleared {
        reaction: Reaction,
        at: DateTime<Utc>,
    },
    PlanningChanged {
        planning: bool,
        at: DateTime<Utc>,
    },
    /// In-memory progress update; persistence follows after the debounce
    /// window closes.
    ProgressChanged {
        percent: u8,
        at: DateTime<Utc>,
    },
    /// The debounced progress write landed in the store.
    ProgressPersisted {
        percent: u8,
        at: DateTime<Utc>,
    },
    SliderOpened {
        at: DateTime<Utc>,
    },
    /// `auto` is true when the auto-close timer hid the slider rather than
    /// an explicit toggle.
    SliderClosed {
        auto: bool,
        at: DateTime<Utc>,
    },
    ParticleBurst {
        at: DateTime<Utc>,
    },
    ParticleExpired {
        at: DateTime<Utc>,
    },
    ShakeStarted {
        at: DateTime<Utc>,
    },
    ShakeEnded {
        at: DateTime<Utc>,
    },
    /// A stored record failed to decode and was replaced with the default.
    RecordRecovered {
        key: StoreKey,
        at: DateTime<Utc>,
    },
}
