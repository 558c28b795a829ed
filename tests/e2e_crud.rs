//! End-to-end integration tests for single-entity CRUD against the
//! in-memory blob backend: create/get, optimistic locking, and delete.

use shardgraph::{AuthContext, GraphConfig, GraphEngine, MemoryBlobBackend, Node, PropertyMap, Value};

fn engine() -> GraphEngine<MemoryBlobBackend> {
    GraphEngine::new(MemoryBlobBackend::new(), GraphConfig::default())
}

// ----------------------------------------------------------------------------
// Create + get: a reader with matching permissions sees the node; a reader
// without them sees nothing rather than a permission error.
// ----------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_honors_permissions() {
    let engine = engine();

    let node = Node::new("", "user")
        .with_property("name", Value::from("Alice"))
        .with_property("age", Value::Int(28))
        .with_permissions(["read"]);
    let created = engine.create_node(node).await.unwrap();
    assert_eq!(created.version, 1);
    assert!(!created.id.is_empty());

    let reader = AuthContext::with_permissions(["read"]);
    let fetched = engine.get_node(&created.id, &reader).await.unwrap();
    assert_eq!(fetched.unwrap().get("name"), Some(&Value::from("Alice")));

    // An outsider gets absent, not a permission error — getNode must not
    // let a caller distinguish "doesn't exist" from "exists but hidden".
    let outsider = AuthContext::with_permissions(["write"]);
    assert!(engine.get_node(&created.id, &outsider).await.unwrap().is_none());
}

// ----------------------------------------------------------------------------
// Optimistic lock: exactly one of two racing updates succeeds
// ----------------------------------------------------------------------------

#[tokio::test]
async fn optimistic_lock_allows_exactly_one_racing_update() {
    let engine = engine();
    let ctx = AuthContext::admin();
    let node = engine.create_node(Node::new("", "user")).await.unwrap();
    assert_eq!(node.version, 1);

    let mut patch_a = PropertyMap::new();
    patch_a.insert("winner".into(), Value::from("a"));
    let mut patch_b = PropertyMap::new();
    patch_b.insert("winner".into(), Value::from("b"));

    let first = engine.update_node(&node.id, patch_a, Some(1), &ctx).await;
    let second = engine.update_node(&node.id, patch_b, Some(1), &ctx).await;

    let results = [first, second];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let conflicted = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == shardgraph::ErrorKind::ConcurrentModification))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(conflicted, 1);

    let winner = results.into_iter().find(|r| r.is_ok()).unwrap().unwrap();
    assert_eq!(winner.version, 2);
}

// ----------------------------------------------------------------------------
// Invalid type: rejected before any backend write
// ----------------------------------------------------------------------------

#[tokio::test]
async fn invalid_type_fails_validation_with_no_side_effects() {
    let engine = engine();
    let err = engine.create_node(Node::new("", "")).await.unwrap_err();
    assert_eq!(err.kind(), shardgraph::ErrorKind::Validation);
    assert!(engine.backend().list("nodes/").await.unwrap().is_empty());
}

// ----------------------------------------------------------------------------
// Delete then get: absent afterwards, and a further update fails
// ----------------------------------------------------------------------------

#[tokio::test]
async fn delete_then_get_is_absent_and_update_fails() {
    let engine = engine();
    let ctx = AuthContext::admin();
    let node = engine.create_node(Node::new("", "user")).await.unwrap();

    engine.delete_node(&node.id, &ctx).await.unwrap();
    assert!(engine.get_node(&node.id, &ctx).await.unwrap().is_none());

    let err = engine
        .update_node(&node.id, PropertyMap::new(), None, &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), shardgraph::ErrorKind::NodeNotFound);
}
