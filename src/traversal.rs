//! # Traversal
//!
//! `queryRelatedNodes` — find nodes reachable from `from` by a relationship
//! type and direction, using the lazily-populated adjacency index where
//! possible and falling back to a backend scan of the relationship type's
//! shard space.

use crate::backend::BlobBackend;
use crate::codec;
use crate::engine::GraphEngine;
use crate::error::Result;
use crate::model::{AuthContext, Direction, Node, Relationship};
use crate::permission::can_access;
use hashbrown::HashSet;

/// All nodes reachable from `from` via relationships of `rel_type` in the
/// given `direction`, filtered by `canAccess`.
pub async fn query_related_nodes<B: BlobBackend>(
    engine: &GraphEngine<B>,
    from: &str,
    rel_type: &str,
    direction: Direction,
    ctx: &AuthContext,
) -> Result<Vec<Node>> {
    let target_ids = related_ids(engine, from, rel_type, direction).await?;

    let mut nodes = Vec::with_capacity(target_ids.len());
    for id in target_ids {
        if let Some(node) = engine.fetch_node(&id).await? {
            if can_access(&node, ctx) {
                nodes.push(node);
            }
        }
    }
    Ok(nodes)
}

async fn related_ids<B: BlobBackend>(
    engine: &GraphEngine<B>,
    from: &str,
    rel_type: &str,
    direction: Direction,
) -> Result<HashSet<String>> {
    match direction {
        // OUT is the only direction the adjacency index tracks directly —
        // it's keyed `(from, type) -> set(to)`.
        Direction::Out => {
            if let Some(cached) = engine.cache().adjacency_get(from, rel_type) {
                return Ok(cached);
            }
            let out = scan_out_edges(engine, from, rel_type).await?;
            engine.cache().adjacency_set(from, rel_type, out.clone());
            Ok(out)
        }
        Direction::In => scan_in_edges(engine, from, rel_type).await,
        Direction::Both => {
            let mut ids = related_ids(engine, from, rel_type, Direction::Out).await?;
            ids.extend(related_ids(engine, from, rel_type, Direction::In).await?);
            Ok(ids)
        }
    }
}

/// Scan every relationship blob under `relationships/{type}/` and collect
/// `to` for edges starting at `from`.
async fn scan_out_edges<B: BlobBackend>(engine: &GraphEngine<B>, from: &str, rel_type: &str) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for rel in scan_relationships_by_type(engine, rel_type).await? {
        if rel.from == from {
            ids.insert(rel.to);
        }
    }
    Ok(ids)
}

/// Same, but for edges ending at `from` (direction `IN`). Not adjacency
/// cached — the index is one-directional by construction; a
/// from-keyed reverse index isn't part of the cache/index store.
async fn scan_in_edges<B: BlobBackend>(engine: &GraphEngine<B>, from: &str, rel_type: &str) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for rel in scan_relationships_by_type(engine, rel_type).await? {
        if rel.to == from {
            ids.insert(rel.from);
        }
    }
    Ok(ids)
}

async fn scan_relationships_by_type<B: BlobBackend>(engine: &GraphEngine<B>, rel_type: &str) -> Result<Vec<Relationship>> {
    let prefix = format!("relationships/{rel_type}/");
    let keys = engine.backend().list(&prefix).await?;
    let mut rels = Vec::with_capacity(keys.len());
    for key in keys {
        if !key.ends_with(".json") {
            continue;
        }
        if let Some(bytes) = engine.backend().get(&key).await? {
            rels.push(codec::decode_relationship(&bytes)?);
        }
    }
    Ok(rels)
}
