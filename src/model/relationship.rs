//! Relationship — a typed directed edge between two nodes.

use super::{PropertyMap, Value};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Out,
    In,
    Both,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Out
    }
}

/// A directed edge. Identity is the triple `(from, to, type)` — at most one
/// relationship per triple exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: PropertyMap,
    #[serde(default)]
    pub permissions: HashSet<String>,
    pub version: u64,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, rel_type: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rel_type: rel_type.into(),
            properties: PropertyMap::new(),
            permissions: HashSet::new(),
            version: 1,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_permissions(mut self, perms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.permissions = perms.into_iter().map(Into::into).collect();
        self
    }

    /// The "other" endpoint from the given node id, if `from` matches either end.
    pub fn other_node(&self, from: &str) -> Option<&str> {
        if from == self.from {
            Some(&self.to)
        } else if from == self.to {
            Some(&self.from)
        } else {
            None
        }
    }

    pub fn is_public(&self) -> bool {
        self.permissions.is_empty()
    }
}
