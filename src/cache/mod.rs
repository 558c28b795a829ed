//! # Cache & Index Store
//!
//! In-memory structures consulted before falling back to the backend:
//! a bounded node-by-id cache, a type index, an equality index, a range
//! index, a compound index, an id -> (type, shard path) location map (the
//! design-note fix that avoids enumerating type directories on every
//! `getNode`), and an adjacency index for traversal.
//!
//! The type/equality/range/compound indexes are only trusted by a lookup
//! once their type has been marked warm by a complete backend scan —
//! incidental single-node touches (a point read backfilling the cache
//! after a miss) populate the buckets but never mark them warm, so a
//! query against a type nobody has fully scanned yet always falls back
//! to the backend instead of returning a partial result.
//!
//! Guarded by `parking_lot` locks — synchronous and atomic relative to the
//! async suspension points in the blob backend: no suspension happens
//! inside a cache/index update.

mod batch;
mod index_key;

pub use batch::BatchOp;
use index_key::{canonical_key, range_key, OrderedF64};

use crate::config::IndexSpec;
use crate::model::{Node, Value};
use hashbrown::{HashMap, HashSet};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// Where an entity physically lives, so a point read never has to
/// enumerate type directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLocation {
    pub node_type: String,
    pub shard_path: String,
}

/// Comparison used by a range-index probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Default)]
struct Indexes {
    type_index: HashMap<String, HashSet<String>>,
    equality: HashMap<(String, String), HashMap<String, HashSet<String>>>,
    range: HashMap<(String, String), BTreeMap<OrderedF64, HashSet<String>>>,
    compound: HashMap<(String, Vec<String>), HashMap<Vec<String>, HashSet<String>>>,
    locations: HashMap<String, EntityLocation>,
    /// `(from_id, rel_type) -> set(to_id)`, populated lazily on first
    /// traversal and invalidated on relationship create/delete.
    adjacency: HashMap<(String, String), HashSet<String>>,
    /// Types whose index buckets (type/equality/range/compound) are known
    /// to reflect every matching entity on the backend, because a full
    /// scan has built them. A type absent here may only hold whatever a
    /// handful of incidental point reads happened to touch, so the
    /// planner must not trust it as a complete answer.
    warm_types: HashSet<String>,
}

pub struct CacheStore {
    index_spec: IndexSpec,
    nodes: Mutex<LruCache<String, Node>>,
    indexes: RwLock<Indexes>,
    batch: Mutex<Option<batch::BatchBuffer>>,
}

impl CacheStore {
    pub fn new(index_spec: IndexSpec, cache_capacity: usize) -> Self {
        let cap = NonZeroUsize::new(cache_capacity.max(1)).unwrap();
        Self {
            index_spec,
            nodes: Mutex::new(LruCache::new(cap)),
            indexes: RwLock::new(Indexes::default()),
            batch: Mutex::new(None),
        }
    }

    // ========================================================================
    // Node-by-id cache + indexes
    // ========================================================================

    /// Feed a node into the cache and every index the configuration tracks.
    /// If a batch is active, the mutation is buffered instead of applied.
    pub fn cache_node(&self, node: &Node, shard_path: &str) {
        if self.buffer_if_batching(batch::BatchOp::CacheNode {
            node: node.clone(),
            shard_path: shard_path.to_string(),
        }) {
            return;
        }
        self.apply_cache_node(node, shard_path);
    }

    fn apply_cache_node(&self, node: &Node, shard_path: &str) {
        self.nodes.lock().put(node.id.clone(), node.clone());

        let mut idx = self.indexes.write();
        idx.locations.insert(
            node.id.clone(),
            EntityLocation {
                node_type: node.node_type.clone(),
                shard_path: shard_path.to_string(),
            },
        );
        idx.type_index
            .entry(node.node_type.clone())
            .or_default()
            .insert(node.id.clone());

        for (t, prop) in self.index_spec.equality.clone() {
            if t != node.node_type {
                continue;
            }
            if let Some(v) = node.properties.get_path_or_flat(&prop) {
                if let Some(key) = canonical_key(v) {
                    idx.equality
                        .entry((t.clone(), prop.clone()))
                        .or_default()
                        .entry(key)
                        .or_default()
                        .insert(node.id.clone());
                }
            }
        }

        for (t, prop) in self.index_spec.range.clone() {
            if t != node.node_type {
                continue;
            }
            if let Some(v) = node.properties.get_path_or_flat(&prop) {
                if let Some(key) = range_key(v) {
                    idx.range
                        .entry((t.clone(), prop.clone()))
                        .or_default()
                        .entry(key)
                        .or_default()
                        .insert(node.id.clone());
                }
            }
        }

        for spec in self.index_spec.compound.clone() {
            if spec.node_type != node.node_type {
                continue;
            }
            let mut key = Vec::with_capacity(spec.properties.len());
            let mut complete = true;
            for prop in &spec.properties {
                match node.properties.get_path_or_flat(prop).and_then(canonical_key) {
                    Some(k) => key.push(k),
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                idx.compound
                    .entry((spec.node_type.clone(), spec.properties.clone()))
                    .or_default()
                    .entry(key)
                    .or_default()
                    .insert(node.id.clone());
            }
        }
    }

    /// Remove a node and every index entry it populated. Callers pass the
    /// node they just loaded (the engine always has it on hand before a
    /// delete), since the LRU cache may have already evicted it.
    pub fn remove_node(&self, node: &Node) {
        if self.buffer_if_batching(batch::BatchOp::RemoveNode { node: node.clone() }) {
            return;
        }
        self.apply_remove_node(node);
    }

    fn apply_remove_node(&self, node: &Node) {
        self.nodes.lock().pop(&node.id);

        let mut idx = self.indexes.write();
        idx.locations.remove(&node.id);
        if let Some(set) = idx.type_index.get_mut(&node.node_type) {
            set.remove(&node.id);
        }

        for (t, prop) in self.index_spec.equality.clone() {
            if t != node.node_type {
                continue;
            }
            if let Some(v) = node.properties.get_path_or_flat(&prop).and_then(canonical_key) {
                if let Some(map) = idx.equality.get_mut(&(t, prop)) {
                    if let Some(set) = map.get_mut(&v) {
                        set.remove(&node.id);
                    }
                }
            }
        }

        for (t, prop) in self.index_spec.range.clone() {
            if t != node.node_type {
                continue;
            }
            if let Some(v) = node.properties.get_path_or_flat(&prop).and_then(range_key) {
                if let Some(map) = idx.range.get_mut(&(t, prop)) {
                    if let Some(set) = map.get_mut(&v) {
                        set.remove(&node.id);
                    }
                }
            }
        }

        for spec in self.index_spec.compound.clone() {
            if spec.node_type != node.node_type {
                continue;
            }
            let key: Option<Vec<String>> = spec
                .properties
                .iter()
                .map(|p| node.properties.get_path_or_flat(p).and_then(canonical_key))
                .collect();
            if let Some(key) = key {
                if let Some(map) = idx.compound.get_mut(&(spec.node_type.clone(), spec.properties.clone())) {
                    if let Some(set) = map.get_mut(&key) {
                        set.remove(&node.id);
                    }
                }
            }
        }
    }

    pub fn get_node(&self, id: &str) -> Option<Node> {
        self.nodes.lock().get(id).cloned()
    }

    pub fn location_of(&self, id: &str) -> Option<EntityLocation> {
        self.indexes.read().locations.get(id).cloned()
    }

    pub fn nodes_by_type(&self, node_type: &str) -> Option<HashSet<String>> {
        if !self.is_type_warm(node_type) {
            return None;
        }
        self.indexes.read().type_index.get(node_type).cloned()
    }

    /// Whether `node_type`'s index buckets have been built by a complete
    /// scan and can be trusted as an authoritative answer rather than a
    /// partial view left over from scattered point reads.
    pub fn is_type_warm(&self, node_type: &str) -> bool {
        self.indexes.read().warm_types.contains(node_type)
    }

    /// Mark `node_type` as backed by a complete scan. Called only from the
    /// single code path that actually performs one.
    pub fn mark_type_warm(&self, node_type: &str) {
        self.indexes.write().warm_types.insert(node_type.to_string());
    }

    /// `None` means "this (type, property) isn't declared in the index
    /// spec, or the type hasn't been fully scanned yet" — the caller must
    /// fall back to a scan. `Some` (possibly empty) means the index is
    /// authoritative for this lookup.
    pub fn equality_lookup(&self, node_type: &str, prop: &str, value: &Value) -> Option<HashSet<String>> {
        if !self.index_spec.has_equality(node_type, prop) || !self.is_type_warm(node_type) {
            return None;
        }
        let key = canonical_key(value)?;
        Some(
            self.indexes
                .read()
                .equality
                .get(&(node_type.to_string(), prop.to_string()))
                .and_then(|m| m.get(&key))
                .cloned()
                .unwrap_or_default(),
        )
    }

    pub fn range_lookup(&self, node_type: &str, prop: &str, op: RangeOp, bound: f64) -> Option<HashSet<String>> {
        if !self.index_spec.has_range(node_type, prop) || !self.is_type_warm(node_type) {
            return None;
        }
        let idx = self.indexes.read();
        let tree = idx.range.get(&(node_type.to_string(), prop.to_string()))?;
        let bound = OrderedF64(bound);
        let mut out = HashSet::new();
        let matches: Box<dyn Iterator<Item = (&OrderedF64, &HashSet<String>)>> = match op {
            RangeOp::Gt => Box::new(tree.range((std::ops::Bound::Excluded(bound), std::ops::Bound::Unbounded))),
            RangeOp::Gte => Box::new(tree.range((std::ops::Bound::Included(bound), std::ops::Bound::Unbounded))),
            RangeOp::Lt => Box::new(tree.range((std::ops::Bound::Unbounded, std::ops::Bound::Excluded(bound)))),
            RangeOp::Lte => Box::new(tree.range((std::ops::Bound::Unbounded, std::ops::Bound::Included(bound)))),
        };
        for (_, set) in matches {
            out.extend(set.iter().cloned());
        }
        Some(out)
    }

    pub fn compound_lookup(&self, node_type: &str, props: &[String], values: &[Value]) -> Option<HashSet<String>> {
        if !self.is_type_warm(node_type) {
            return None;
        }
        let spec = self.index_spec.find_compound(node_type, &props.to_vec())?;
        // Reorder `values` to match the index's declared property order.
        let mut key = Vec::with_capacity(spec.properties.len());
        for declared_prop in &spec.properties {
            let pos = props.iter().position(|p| p == declared_prop)?;
            key.push(canonical_key(&values[pos])?);
        }
        Some(
            self.indexes
                .read()
                .compound
                .get(&(node_type.to_string(), spec.properties.clone()))
                .and_then(|m| m.get(&key))
                .cloned()
                .unwrap_or_default(),
        )
    }

    // ========================================================================
    // Adjacency index
    // ========================================================================

    pub fn adjacency_get(&self, from: &str, rel_type: &str) -> Option<HashSet<String>> {
        self.indexes
            .read()
            .adjacency
            .get(&(from.to_string(), rel_type.to_string()))
            .cloned()
    }

    pub fn adjacency_set(&self, from: &str, rel_type: &str, targets: HashSet<String>) {
        self.indexes
            .write()
            .adjacency
            .insert((from.to_string(), rel_type.to_string()), targets);
    }

    /// Drop a bucket so the next traversal rebuilds it from a full backend
    /// scan. Called on both relationship create and delete: a bucket must
    /// never be patched incrementally, since it may not have reflected
    /// every pre-existing edge in the first place.
    pub fn adjacency_invalidate(&self, from: &str, rel_type: &str) {
        self.indexes
            .write()
            .adjacency
            .remove(&(from.to_string(), rel_type.to_string()));
    }

    // ========================================================================
    // Batch mode
    // ========================================================================

    pub fn start_batch(&self) {
        *self.batch.lock() = Some(batch::BatchBuffer::default());
    }

    /// Apply every buffered mutation atomically (from the perspective of
    /// any other reader — each individual apply is itself synchronous).
    pub fn commit_batch(&self) {
        let buffered = self.batch.lock().take();
        if let Some(buf) = buffered {
            for op in buf.ops {
                match op {
                    batch::BatchOp::CacheNode { node, shard_path } => {
                        self.apply_cache_node(&node, &shard_path)
                    }
                    batch::BatchOp::RemoveNode { node } => self.apply_remove_node(&node),
                }
            }
        }
    }

    /// Discard the buffer without applying anything.
    pub fn abort_batch(&self) {
        *self.batch.lock() = None;
    }

    pub fn is_batching(&self) -> bool {
        self.batch.lock().is_some()
    }

    /// The uncommitted view, for the caller that started the batch: buffered
    /// mutations layered on top of the committed node, most recent wins.
    pub fn get_node_in_batch(&self, id: &str) -> Option<Node> {
        if let Some(buf) = self.batch.lock().as_ref() {
            for op in buf.ops.iter().rev() {
                match op {
                    batch::BatchOp::CacheNode { node, .. } if node.id == id => return Some(node.clone()),
                    batch::BatchOp::RemoveNode { node } if node.id == id => return None,
                    _ => continue,
                }
            }
        }
        self.get_node(id)
    }

    fn buffer_if_batching(&self, op: batch::BatchOp) -> bool {
        let mut guard = self.batch.lock();
        if let Some(buf) = guard.as_mut() {
            buf.ops.push(op);
            true
        } else {
            false
        }
    }
}

/// Dotted-path lookup that also accepts a flat top-level key containing
/// dots, falling back to the nested-map traversal — properties are
/// usually flat, but the index spec addresses them by path either way.
trait PropertyPathLookup {
    fn get_path_or_flat<'a>(&'a self, path: &str) -> Option<&'a Value>;
}

impl PropertyPathLookup for crate::model::PropertyMap {
    fn get_path_or_flat<'a>(&'a self, path: &str) -> Option<&'a Value> {
        if let Some(v) = self.get(path) {
            return Some(v);
        }
        let mut parts = path.splitn(2, '.');
        let head = parts.next()?;
        let rest = parts.next();
        let first = self.get(head)?;
        match rest {
            Some(rest) => first.get_path(rest),
            None => Some(first),
        }
    }
}
