//! Identifier and stack types shared by client and authority.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle of an entity (container or item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Client-session-local identifier of one submitted inventory change.
///
/// Assigned by post-increment and echoed back unchanged in the acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangeId(pub u64);

impl ChangeId {
    /// Return this id and advance `self` to the next one.
    pub fn post_increment(&mut self) -> ChangeId {
        let current = *self;
        self.0 += 1;
        current
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of stackable resource held by an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKind(pub String);

impl ResourceKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A stack occupying a slot: the item entity plus its resource kind and count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Item entity.
    pub id: EntityId,
    /// Resource kind of the stack.
    pub kind: ResourceKind,
    /// Number of units in the stack (never zero for a live item).
    pub count: u32,
}

impl ItemRecord {
    pub fn new(id: EntityId, kind: impl Into<ResourceKind>, count: u32) -> Self {
        Self {
            id,
            kind: kind.into(),
            count,
        }
    }
}
