//! Node — a typed entity in the graph.

use super::{PropertyMap, Value};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// A node, addressed by its opaque `id` and immutable `type`.
///
/// `version` starts at 1 on create and is incremented by exactly one on
/// every successful mutation — the sole concurrency discipline the engine
/// offers (optimistic locking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub properties: PropertyMap,
    #[serde(default)]
    pub permissions: HashSet<String>,
    pub version: u64,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
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

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Public iff `permissions` is empty.
    pub fn is_public(&self) -> bool {
        self.permissions.is_empty()
    }
}
