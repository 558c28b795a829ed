//! # Storage Engine
//!
//! Orchestrates the validator, permission gate, sharding strategy, codec,
//! and cache/index store around a `BlobBackend` for single-entity CRUD.
//! Owns versioning and optimistic locking — the only concurrency
//! discipline the engine offers between callers sharing an instance.

use crate::backend::BlobBackend;
use crate::cache::CacheStore;
use crate::codec;
use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::model::{AuthContext, Node, PropertyMap, Relationship};
use crate::permission::can_access;
use crate::shard;
use crate::validate;
use chrono::Utc;
use hashbrown::HashSet;
use uuid::Uuid;

fn node_key(node_type: &str, shard_path: &str, id: &str) -> String {
    format!("nodes/{node_type}/{shard_path}/{id}.json")
}

fn relationship_key(rel_type: &str, shard_path: &str, from: &str, to: &str) -> String {
    format!("relationships/{rel_type}/{shard_path}/{from}__{to}.json")
}

/// Pull the shard path out of a full node key, given the `nodes/{type}/`
/// prefix and `{id}.json` suffix that bound it.
fn shard_path_from_key(key: &str, prefix: &str, id: &str) -> String {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(&format!("{id}.json")))
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_default()
}

/// Entry point wrapping a blob backend with everything needed for
/// entity-level reads and writes.
pub struct GraphEngine<B: BlobBackend> {
    backend: B,
    cache: CacheStore,
    config: GraphConfig,
}

impl<B: BlobBackend> GraphEngine<B> {
    pub fn new(backend: B, config: GraphConfig) -> Self {
        let cache = CacheStore::new(config.index_spec.clone(), config.cache_capacity);
        Self { backend, cache, config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn cache(&self) -> &CacheStore {
        &self.cache
    }

    // ========================================================================
    // Node operations
    // ========================================================================

    pub async fn create_node(&self, mut node: Node) -> Result<Node> {
        if node.id.is_empty() {
            node.id = Uuid::new_v4().to_string();
        }
        validate::validate_node(&node)?;
        node.version = 1;

        let shard_path = shard::node_shard_path(&self.config, &node.id, Utc::now());
        let key = node_key(&node.node_type, &shard_path, &node.id);
        let bytes = codec::encode_node(&node)?;
        self.backend.put(&key, bytes).await?;
        self.cache.cache_node(&node, &shard_path);
        tracing::info!(id = %node.id, node_type = %node.node_type, "node created");
        Ok(node)
    }

    /// Unlike every other read, a permission denial here is reported as
    /// absence rather than an error — the one op where a caller probing an
    /// id must not be able to distinguish "doesn't exist" from "exists but
    /// you can't see it".
    pub async fn get_node(&self, id: &str, ctx: &AuthContext) -> Result<Option<Node>> {
        match self.load_node(id).await? {
            None => Ok(None),
            Some((node, _)) => {
                if can_access(&node, ctx) {
                    Ok(Some(node))
                } else {
                    tracing::warn!(id, "permission denied on getNode, reporting as absent");
                    Ok(None)
                }
            }
        }
    }

    pub async fn update_node(
        &self,
        id: &str,
        patch: PropertyMap,
        expected_version: Option<u64>,
        ctx: &AuthContext,
    ) -> Result<Node> {
        let (mut node, shard_path) = self.require_node(id, ctx).await?;
        if let Some(expected) = expected_version {
            if node.version != expected {
                tracing::warn!(id, expected, found = node.version, "concurrent modification");
                return Err(Error::ConcurrentModification {
                    expected,
                    found: node.version,
                });
            }
        }
        crate::model::merge_shallow(&mut node.properties, patch);
        node.version += 1;

        let key = node_key(&node.node_type, &shard_path, id);
        let bytes = codec::encode_node(&node)?;
        self.backend.put(&key, bytes).await?;
        self.cache.cache_node(&node, &shard_path);
        tracing::info!(id, version = node.version, "node updated");
        Ok(node)
    }

    pub async fn delete_node(&self, id: &str, ctx: &AuthContext) -> Result<()> {
        let (node, shard_path) = self.require_node(id, ctx).await?;
        let key = node_key(&node.node_type, &shard_path, id);
        self.backend.delete(&key).await?;
        self.cache.remove_node(&node);
        tracing::info!(id, "node deleted");
        Ok(())
    }

    /// Resolves `id` to `(node, shard_path)`, consulting the cache/location
    /// index first and falling back to a backend scan. The location index
    /// exists precisely to avoid repeating this scan.
    async fn load_node(&self, id: &str) -> Result<Option<(Node, String)>> {
        if let Some(node) = self.cache.get_node(id) {
            let shard_path = self
                .cache
                .location_of(id)
                .map(|loc| loc.shard_path)
                .unwrap_or_default();
            return Ok(Some((node, shard_path)));
        }

        let location = match self.cache.location_of(id) {
            Some(loc) => Some((loc.node_type, loc.shard_path)),
            None => self.find_node_location(id).await?,
        };
        let Some((node_type, shard_path)) = location else {
            return Ok(None);
        };

        let key = node_key(&node_type, &shard_path, id);
        let bytes = match self.backend.get(&key).await? {
            Some(b) => b,
            None => return Ok(None),
        };
        let node = codec::decode_node(&bytes)?;
        self.cache.cache_node(&node, &shard_path);
        Ok(Some((node, shard_path)))
    }

    /// Like `load_node`, but `NodeNotFound`/`PermissionDenied` instead of an
    /// absent result — used by operations whose contract requires the
    /// entity to exist and be accessible (update, delete, relationship
    /// endpoint checks).
    async fn require_node(&self, id: &str, ctx: &AuthContext) -> Result<(Node, String)> {
        let (node, shard_path) = self
            .load_node(id)
            .await?
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        if !can_access(&node, ctx) {
            return Err(Error::PermissionDenied(format!("node {id}")));
        }
        Ok((node, shard_path))
    }

    /// Fetch a node by id without a permission check — the query planner
    /// applies `canAccess` itself once candidates are resolved.
    pub(crate) async fn fetch_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.load_node(id).await?.map(|(node, _)| node))
    }

    /// Decode every node blob under a type's subtree (or the whole `nodes/`
    /// space if `node_type` is `None`) — the full-scan fallback for queries
    /// with no usable index. This is the sole code path that establishes
    /// index completeness: every decoded node is fed into the cache, and
    /// every type this enumeration actually covered is marked warm, so the
    /// planner can trust its indexes for that type from here on.
    pub(crate) async fn scan_type(&self, node_type: Option<&str>) -> Result<Vec<Node>> {
        let prefix = match node_type {
            Some(t) => format!("nodes/{t}/"),
            None => "nodes/".to_string(),
        };
        let keys = self.backend.list(&prefix).await?;
        let mut nodes = Vec::with_capacity(keys.len());
        let mut types_seen: HashSet<String> = HashSet::new();
        for key in &keys {
            if !key.ends_with(".json") {
                continue;
            }
            let Some(rest) = key.strip_prefix("nodes/") else {
                continue;
            };
            let Some(type_in_key) = rest.split('/').next() else {
                continue;
            };
            let type_in_key = type_in_key.to_string();

            if let Some(bytes) = self.backend.get(key).await? {
                let node = codec::decode_node(&bytes)?;
                let type_prefix = format!("nodes/{type_in_key}/");
                let shard_path = shard_path_from_key(key, &type_prefix, &node.id);
                self.cache.cache_node(&node, &shard_path);
                types_seen.insert(type_in_key);
                nodes.push(node);
            }
        }

        match node_type {
            Some(t) => self.cache.mark_type_warm(t),
            None => {
                for t in &types_seen {
                    self.cache.mark_type_warm(t);
                }
            }
        }
        Ok(nodes)
    }

    /// Scans type directories under `nodes/` looking for `{id}.json` inside
    /// their shard subtree. Expensive by design — the location index exists
    /// precisely to avoid this; only runs on a cold cache.
    async fn find_node_location(&self, id: &str) -> Result<Option<(String, String)>> {
        let top = self.backend.list("nodes/").await?;
        let mut types: HashSet<String> = HashSet::new();
        for key in &top {
            if let Some(rest) = key.strip_prefix("nodes/") {
                if let Some(t) = rest.split('/').next() {
                    types.insert(t.to_string());
                }
            }
        }

        let suffix = format!("/{id}.json");
        for node_type in types {
            let prefix = format!("nodes/{node_type}/");
            let keys = self.backend.list(&prefix).await?;
            if let Some(key) = keys.iter().find(|k| k.ends_with(&suffix)) {
                let shard_path = shard_path_from_key(key, &prefix, id);
                return Ok(Some((node_type, shard_path)));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Relationship operations
    // ========================================================================

    pub async fn create_relationship(&self, mut rel: Relationship, ctx: &AuthContext) -> Result<Relationship> {
        validate::validate_relationship(&rel, &self.config)?;
        self.require_node(&rel.from, ctx).await?;
        self.require_node(&rel.to, ctx).await?;
        rel.version = 1;

        let shard_path = shard::relationship_shard_path(&self.config, &rel.from, &rel.to);
        let key = relationship_key(&rel.rel_type, &shard_path, &rel.from, &rel.to);
        let bytes = codec::encode_relationship(&rel)?;
        self.backend.put(&key, bytes).await?;
        self.cache.adjacency_invalidate(&rel.from, &rel.rel_type);
        tracing::info!(from = %rel.from, to = %rel.to, rel_type = %rel.rel_type, "relationship created");
        Ok(rel)
    }

    pub async fn get_relationship(
        &self,
        from: &str,
        to: &str,
        rel_type: &str,
        ctx: &AuthContext,
    ) -> Result<Option<Relationship>> {
        match self.load_relationship(from, to, rel_type).await? {
            None => Ok(None),
            Some(rel) => {
                if can_access(&rel, ctx) {
                    Ok(Some(rel))
                } else {
                    Err(Error::PermissionDenied(format!("relationship {from}-[{rel_type}]->{to}")))
                }
            }
        }
    }

    pub async fn update_relationship(
        &self,
        from: &str,
        to: &str,
        rel_type: &str,
        patch: PropertyMap,
        expected_version: Option<u64>,
        ctx: &AuthContext,
    ) -> Result<Relationship> {
        let mut rel = self.require_relationship(from, to, rel_type, ctx).await?;
        if let Some(expected) = expected_version {
            if rel.version != expected {
                return Err(Error::ConcurrentModification {
                    expected,
                    found: rel.version,
                });
            }
        }
        crate::model::merge_shallow(&mut rel.properties, patch);
        rel.version += 1;

        let shard_path = shard::relationship_shard_path(&self.config, from, to);
        let key = relationship_key(rel_type, &shard_path, from, to);
        let bytes = codec::encode_relationship(&rel)?;
        self.backend.put(&key, bytes).await?;
        tracing::info!(from, to, rel_type, version = rel.version, "relationship updated");
        Ok(rel)
    }

    pub async fn delete_relationship(&self, from: &str, to: &str, rel_type: &str, ctx: &AuthContext) -> Result<()> {
        self.require_relationship(from, to, rel_type, ctx).await?;
        let shard_path = shard::relationship_shard_path(&self.config, from, to);
        let key = relationship_key(rel_type, &shard_path, from, to);
        self.backend.delete(&key).await?;
        self.cache.adjacency_invalidate(from, rel_type);
        tracing::info!(from, to, rel_type, "relationship deleted");
        Ok(())
    }

    async fn load_relationship(&self, from: &str, to: &str, rel_type: &str) -> Result<Option<Relationship>> {
        let shard_path = shard::relationship_shard_path(&self.config, from, to);
        let key = relationship_key(rel_type, &shard_path, from, to);
        match self.backend.get(&key).await? {
            Some(bytes) => Ok(Some(codec::decode_relationship(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn require_relationship(
        &self,
        from: &str,
        to: &str,
        rel_type: &str,
        ctx: &AuthContext,
    ) -> Result<Relationship> {
        let rel = self.load_relationship(from, to, rel_type).await?.ok_or_else(|| {
            Error::RelationshipNotFound {
                from: from.to_string(),
                to: to.to_string(),
                rel_type: rel_type.to_string(),
            }
        })?;
        if !can_access(&rel, ctx) {
            return Err(Error::PermissionDenied(format!("relationship {from}-[{rel_type}]->{to}")));
        }
        Ok(rel)
    }
}
