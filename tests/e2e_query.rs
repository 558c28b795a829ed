//! End-to-end query planner tests: range probe + pagination, and
//! index-probe vs. full-scan equivalence.

use shardgraph::{
    AuthContext, CompoundIndexSpec, Filter, GraphConfig, GraphEngine, IndexSpec, MemoryBlobBackend, Node,
    Operator, Pagination, QuerySpec, SortDirection, SortKey, Value,
};

fn type_eq(t: &str) -> Filter {
    Filter::Leaf {
        field: "type".into(),
        operator: Operator::Eq,
        value: Value::from(t),
    }
}

async fn engine_with_ages() -> GraphEngine<MemoryBlobBackend> {
    let cfg = GraphConfig {
        index_spec: IndexSpec {
            equality: vec![("user".into(), "name".into())],
            range: vec![("user".into(), "age".into())],
            compound: vec![CompoundIndexSpec {
                node_type: "user".into(),
                properties: vec!["name".into(), "age".into()],
            }],
        },
        ..GraphConfig::default()
    };
    let engine = GraphEngine::new(MemoryBlobBackend::new(), cfg);
    for age in 20..30 {
        let node = Node::new("", "user")
            .with_property("name", Value::from(format!("user-{age}")))
            .with_property("age", Value::Int(age));
        engine.create_node(node).await.unwrap();
    }
    engine
}

// ----------------------------------------------------------------------------
// Range query with pagination
// ----------------------------------------------------------------------------

#[tokio::test]
async fn range_filter_and_page_through_sorted_results() {
    let engine = engine_with_ages().await;

    let under_26 = QuerySpec {
        filter: Some(Filter::And(vec![
            type_eq("user"),
            Filter::Leaf {
                field: "age".into(),
                operator: Operator::Lte,
                value: Value::Int(25),
            },
        ])),
        sort: vec![],
        pagination: None,
    };
    let out = shardgraph::execute_query(&engine, &under_26, &AuthContext::admin()).await.unwrap();
    assert_eq!(out.total, 6); // ages 20..=25

    let paged = QuerySpec {
        sort: vec![SortKey {
            field: "properties.age".into(),
            direction: SortDirection::Asc,
        }],
        pagination: Some(Pagination { offset: 2, limit: Some(2) }),
        ..under_26
    };
    let out = shardgraph::execute_query(&engine, &paged, &AuthContext::admin()).await.unwrap();
    let ages: Vec<i64> = out
        .items
        .iter()
        .map(|n| match n.get("age") {
            Some(Value::Int(i)) => *i,
            _ => panic!("missing age"),
        })
        .collect();
    assert_eq!(ages, vec![22, 23]);
    assert!(out.has_more);
}

#[tokio::test]
async fn pagination_concatenates_to_the_full_sorted_list() {
    let engine = engine_with_ages().await;
    let base = QuerySpec {
        filter: Some(type_eq("user")),
        sort: vec![SortKey {
            field: "properties.age".into(),
            direction: SortDirection::Asc,
        }],
        pagination: None,
    };

    let full = shardgraph::execute_query(&engine, &base, &AuthContext::admin()).await.unwrap();

    let page_size = 3;
    let mut concatenated = Vec::new();
    let mut offset = 0;
    loop {
        let page_spec = QuerySpec {
            pagination: Some(Pagination { offset, limit: Some(page_size) }),
            ..base.clone()
        };
        let page = shardgraph::execute_query(&engine, &page_spec, &AuthContext::admin()).await.unwrap();
        if page.items.is_empty() {
            break;
        }
        offset += page.items.len();
        concatenated.extend(page.items);
    }

    let full_ids: Vec<String> = full.items.iter().map(|n| n.id.clone()).collect();
    let concatenated_ids: Vec<String> = concatenated.iter().map(|n| n.id.clone()).collect();
    assert_eq!(full_ids, concatenated_ids);
}
