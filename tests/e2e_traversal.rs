//! End-to-end traversal tests: `queryRelatedNodes` across directions.

use hashbrown::HashSet;
use shardgraph::{AuthContext, Direction, GraphConfig, GraphEngine, MemoryBlobBackend, Node, Relationship};

// ----------------------------------------------------------------------------
// Relationship traversal across both directions
// ----------------------------------------------------------------------------

#[tokio::test]
async fn out_and_in_traversal_find_the_right_neighbors() {
    let engine = GraphEngine::new(MemoryBlobBackend::new(), GraphConfig::default());
    let ctx = AuthContext::admin();

    engine.create_node(Node::new("U", "user")).await.unwrap();
    engine.create_node(Node::new("V", "user")).await.unwrap();
    engine.create_node(Node::new("W", "user")).await.unwrap();

    engine
        .create_relationship(Relationship::new("U", "V", "FOLLOWS"), &ctx)
        .await
        .unwrap();
    engine
        .create_relationship(Relationship::new("U", "W", "FOLLOWS"), &ctx)
        .await
        .unwrap();

    let out = shardgraph::query_related_nodes(&engine, "U", "FOLLOWS", Direction::Out, &ctx)
        .await
        .unwrap();
    let out_ids: HashSet<String> = out.into_iter().map(|n| n.id).collect();
    assert_eq!(out_ids, HashSet::from_iter(["V".to_string(), "W".to_string()]));

    let incoming = shardgraph::query_related_nodes(&engine, "V", "FOLLOWS", Direction::In, &ctx)
        .await
        .unwrap();
    let incoming_ids: HashSet<String> = incoming.into_iter().map(|n| n.id).collect();
    assert_eq!(incoming_ids, HashSet::from_iter(["U".to_string()]));
}

#[tokio::test]
async fn both_direction_unions_out_and_in() {
    let engine = GraphEngine::new(MemoryBlobBackend::new(), GraphConfig::default());
    let ctx = AuthContext::admin();

    engine.create_node(Node::new("U", "user")).await.unwrap();
    engine.create_node(Node::new("V", "user")).await.unwrap();
    engine
        .create_relationship(Relationship::new("U", "V", "FOLLOWS"), &ctx)
        .await
        .unwrap();
    engine
        .create_relationship(Relationship::new("V", "U", "FOLLOWS"), &ctx)
        .await
        .unwrap();

    let both = shardgraph::query_related_nodes(&engine, "U", "FOLLOWS", Direction::Both, &ctx)
        .await
        .unwrap();
    let ids: HashSet<String> = both.into_iter().map(|n| n.id).collect();
    assert_eq!(ids, HashSet::from_iter(["V".to_string()]));
}

#[tokio::test]
async fn dangling_relationship_after_node_delete_is_not_fatal() {
    let engine = GraphEngine::new(MemoryBlobBackend::new(), GraphConfig::default());
    let ctx = AuthContext::admin();

    engine.create_node(Node::new("U", "user")).await.unwrap();
    engine.create_node(Node::new("V", "user")).await.unwrap();
    engine
        .create_relationship(Relationship::new("U", "V", "FOLLOWS"), &ctx)
        .await
        .unwrap();

    // deleteNode never cascades — the relationship survives,
    // and traversal simply can't resolve the missing endpoint.
    engine.delete_node("V", &ctx).await.unwrap();
    let out = shardgraph::query_related_nodes(&engine, "U", "FOLLOWS", Direction::Out, &ctx)
        .await
        .unwrap();
    assert!(out.is_empty());
}
