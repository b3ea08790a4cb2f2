//! Viewer and item identity.
//!
//! The store is keyed by a typed [`StoreKey`] rather than a concatenated
//! string, so merge semantics are stated against a real key type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a signed-in viewer, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(String);

impl ViewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The current viewer as reported by the identity collaborator.
///
/// Anonymous viewers can browse but every mutating engagement operation is
/// rejected with `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum Viewer {
    Anonymous,
    SignedIn(ViewerId),
}

impl Viewer {
    pub fn signed_in(id: impl Into<String>) -> Self {
        Viewer::SignedIn(ViewerId::new(id))
    }

    pub fn id(&self) -> Option<&ViewerId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::SignedIn(id) => Some(id),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Viewer::SignedIn(_))
    }
}

/// Store key: one record per `(viewer, item)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    pub viewer: ViewerId,
    pub item: ItemId,
}

impl StoreKey {
    pub fn new(viewer: ViewerId, item: ItemId) -> Self {
        Self { viewer, item }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.viewer, self.item)
    }
}
