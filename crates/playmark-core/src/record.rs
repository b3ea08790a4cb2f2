//! Engagement records and merge patches.
//!
//! An [`EngagementRecord`] captures one viewer's relationship to one catalog
//! item: the reaction axis (like / love / dislike), planning intent, and
//! play progress. Records live in a [`RecordStore`](crate::store::RecordStore)
//! and are mutated exclusively through the controller; partial updates travel
//! as a [`RecordPatch`].
//!
//! ## Invariants
//!
//! - At most one of `liked`, `loved`, `disliked` is true at any time.
//! - `play_progress` stays within 0..=100 (not required to be monotonic).
//! - `played` is true iff `play_progress > 0` or a play-start action set it.

use serde::{Deserialize, Serialize};

/// One axis of the reaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Love,
    Dislike,
}

/// Persisted engagement state for one `(viewer, item)` pair.
///
/// The zero value (`Default`) is the record of a viewer who has never touched
/// the item; it is what `load` yields when the store has no entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub loved: bool,
    #[serde(default)]
    pub disliked: bool,
    #[serde(default)]
    pub planning: bool,
    /// Play progress percentage, clamped to 0..=100.
    #[serde(default)]
    pub play_progress: u8,
    #[serde(default)]
    pub played: bool,
}

impl EngagementRecord {
    /// The currently active reaction, if any.
    pub fn reaction(&self) -> Option<Reaction> {
        if self.liked {
            Some(Reaction::Like)
        } else if self.loved {
            Some(Reaction::Love)
        } else if self.disliked {
            Some(Reaction::Dislike)
        } else {
            None
        }
    }

    /// Toggle `kind` on the reaction axis.
    ///
    /// If `kind` is already active it is cleared (back to the none state);
    /// otherwise it becomes active and the other two flags are forced false.
    /// Returns whether `kind` is active after the call.
    pub fn toggle_reaction(&mut self, kind: Reaction) -> bool {
        let was_active = self.reaction() == Some(kind);
        self.liked = !was_active && kind == Reaction::Like;
        self.loved = !was_active && kind == Reaction::Love;
        self.disliked = !was_active && kind == Reaction::Dislike;
        !was_active
    }

    /// Set play progress, clamping to 0..=100. `played` follows the
    /// progress value.
    pub fn set_progress(&mut self, percent: u8) {
        self.play_progress = percent.min(100);
        self.played = self.play_progress > 0;
    }

    /// Shallow-merge `patch` over this record. Fields the patch leaves
    /// `None` keep their current value.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(liked) = patch.liked {
            self.liked = liked;
        }
        if let Some(loved) = patch.loved {
            self.loved = loved;
        }
        if let Some(disliked) = patch.disliked {
            self.disliked = disliked;
        }
        if let Some(planning) = patch.planning {
            self.planning = planning;
        }
        if let Some(percent) = patch.play_progress {
            self.play_progress = percent.min(100);
        }
        if let Some(played) = patch.played {
            self.played = played;
        }
    }
}

/// Partial record used for merge-writes.
///
/// A patch carries only the fields an operation changed; the store merges it
/// over whatever is already persisted (or the zero record if nothing is).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disliked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played: Option<bool>,
}

impl RecordPatch {
    /// Patch carrying the full reaction axis of `record`. Reaction writes
    /// always ship all three flags so mutual exclusion survives the merge.
    pub fn reactions(record: &EngagementRecord) -> Self {
        Self {
            liked: Some(record.liked),
            loved: Some(record.loved),
            disliked: Some(record.disliked),
            ..Self::default()
        }
    }

    /// Patch carrying only the planning flag.
    pub fn planning(planning: bool) -> Self {
        Self {
            planning: Some(planning),
            ..Self::default()
        }
    }

    /// Patch carrying play progress and the derived `played` flag.
    pub fn progress(percent: u8, played: bool) -> Self {
        Self {
            play_progress: Some(percent),
            played: Some(played),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combine two patches; fields set in `later` win.
    pub fn overlaid(self, later: RecordPatch) -> RecordPatch {
        RecordPatch {
            liked: later.liked.or(self.liked),
            loved: later.loved.or(self.loved),
            disliked: later.disliked.or(self.disliked),
            planning: later.planning.or(self.planning),
            play_progress: later.play_progress.or(self.play_progress),
            played: later.played.or(self.played),
        }
    }
}
