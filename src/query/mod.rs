//! # Query Planner
//!
//! Picks the cheapest available index for a filter, falls back to a
//! backend scan narrowed by `type` when nothing covers it, then applies
//! whatever sort and pagination the caller asked for.

use crate::backend::BlobBackend;
use crate::cache::RangeOp;
use crate::engine::GraphEngine;
use crate::error::Result;
use crate::model::{AuthContext, Node, Value};
use crate::permission::can_access;
use hashbrown::HashSet;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
}

#[derive(Debug, Clone)]
pub enum Filter {
    Leaf { field: String, operator: Operator, value: Value },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub filter: Option<Filter>,
    pub sort: Vec<SortKey>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub items: Vec<Node>,
    pub total: usize,
    pub has_more: bool,
}

/// Strips a `properties.` prefix so filter/sort fields line up with the
/// bare property names an `IndexSpec` declares.
fn strip_properties_prefix(field: &str) -> &str {
    field.strip_prefix("properties.").unwrap_or(field)
}

fn resolve_field(node: &Node, field: &str) -> Option<Value> {
    match field {
        "type" => return Some(Value::String(node.node_type.clone())),
        "id" => return Some(Value::String(node.id.clone())),
        _ => {}
    }
    let path = strip_properties_prefix(field);
    let mut parts = path.splitn(2, '.');
    let head = parts.next()?;
    let rest = parts.next();
    let first = node.properties.get(head)?;
    match rest {
        Some(rest) => first.get_path(rest).cloned(),
        None => Some(first.clone()),
    }
}

fn evaluate_leaf(node: &Node, field: &str, operator: Operator, expected: &Value) -> bool {
    let actual = resolve_field(node, field);
    match operator {
        Operator::Eq => actual.as_ref() == Some(expected),
        Operator::Neq => actual.as_ref() != Some(expected),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            match (actual.as_ref().and_then(Value::as_f64), expected.as_f64()) {
                (Some(a), Some(b)) => match operator {
                    Operator::Gt => a > b,
                    Operator::Gte => a >= b,
                    Operator::Lt => a < b,
                    Operator::Lte => a <= b,
                    _ => unreachable!(),
                },
                _ => false,
            }
        }
        Operator::Contains => match (&actual, expected) {
            (Some(Value::String(s)), Value::String(needle)) => s.contains(needle.as_str()),
            (Some(Value::List(items)), needle) => items.contains(needle),
            _ => false,
        },
        Operator::In => match expected {
            Value::List(items) => actual.map(|a| items.contains(&a)).unwrap_or(false),
            _ => false,
        },
    }
}

fn matches_filter(node: &Node, filter: &Filter) -> bool {
    match filter {
        Filter::Leaf { field, operator, value } => evaluate_leaf(node, field, *operator, value),
        Filter::And(children) => children.iter().all(|c| matches_filter(node, c)),
        Filter::Or(children) => children.iter().any(|c| matches_filter(node, c)),
    }
}

struct Leaf<'a> {
    field: &'a str,
    operator: Operator,
    value: &'a Value,
}

/// A top-level filter is a "simple conjunction" iff it is a single leaf or
/// an `And` of leaves with no nested `and`/`or` — anything richer (any
/// `Or`, or nested grouping) isn't index-coverable and falls through to a
/// scan.
fn flatten_simple_conjunction(filter: &Filter) -> Option<Vec<Leaf<'_>>> {
    match filter {
        Filter::Leaf { field, operator, value } => Some(vec![Leaf { field, operator: *operator, value }]),
        Filter::And(children) => {
            let mut leaves = Vec::with_capacity(children.len());
            for child in children {
                match child {
                    Filter::Leaf { field, operator, value } => {
                        leaves.push(Leaf { field, operator: *operator, value })
                    }
                    _ => return None,
                }
            }
            Some(leaves)
        }
        Filter::Or(_) => None,
    }
}

fn range_op(operator: Operator) -> Option<RangeOp> {
    match operator {
        Operator::Gt => Some(RangeOp::Gt),
        Operator::Gte => Some(RangeOp::Gte),
        Operator::Lt => Some(RangeOp::Lt),
        Operator::Lte => Some(RangeOp::Lte),
        _ => None,
    }
}

/// Resolve the filter to a candidate node set via the cheapest available
/// index, preferring the most selective one available, falling back to a full scan.
async fn plan_candidates<B: BlobBackend>(engine: &GraphEngine<B>, filter: Option<&Filter>) -> Result<Vec<Node>> {
    let Some(filter) = filter else {
        return engine.scan_type(None).await;
    };

    let Some(leaves) = flatten_simple_conjunction(filter) else {
        // Filter has an `or` somewhere — narrow by type if we can still
        // find a top-level type leaf, otherwise fall back to a full scan.
        let node_type = find_type_leaf(filter);
        return fetch_candidates_by_scan(engine, node_type.as_deref()).await;
    };

    let type_leaf_value = leaves
        .iter()
        .find(|l| l.field == "type" && l.operator == Operator::Eq)
        .and_then(|l| l.value.as_str());
    let Some(node_type) = type_leaf_value else {
        return fetch_candidates_by_scan(engine, None).await;
    };

    let remaining: Vec<&Leaf<'_>> = leaves
        .iter()
        .filter(|l| !(l.field == "type" && l.operator == Operator::Eq))
        .collect();

    // 1. Compound index: every remaining predicate is equality and the
    //    field set exactly matches a declared compound index.
    if !remaining.is_empty() && remaining.iter().all(|l| l.operator == Operator::Eq) {
        let fields: Vec<String> = remaining.iter().map(|l| strip_properties_prefix(l.field).to_string()).collect();
        let values: Vec<Value> = remaining.iter().map(|l| l.value.clone()).collect();
        if let Some(ids) = engine.cache().compound_lookup(node_type, &fields, &values) {
            return fetch_by_ids(engine, ids).await;
        }
    }

    // 2. Range index: exactly one comparison predicate on an indexed field.
    if remaining.len() == 1 {
        if let Some(op) = range_op(remaining[0].operator) {
            let field = strip_properties_prefix(remaining[0].field);
            if let Some(bound) = remaining[0].value.as_f64() {
                if let Some(ids) = engine.cache().range_lookup(node_type, field, op, bound) {
                    return fetch_by_ids(engine, ids).await;
                }
            }
        }
    }

    // 3. Equality index: exactly one equality predicate on an indexed field.
    if remaining.len() == 1 && remaining[0].operator == Operator::Eq {
        let field = strip_properties_prefix(remaining[0].field);
        if let Some(ids) = engine.cache().equality_lookup(node_type, field, remaining[0].value) {
            return fetch_by_ids(engine, ids).await;
        }
    }

    // 4. Type index: filter constrains only `type`.
    if remaining.is_empty() {
        if let Some(ids) = engine.cache().nodes_by_type(node_type) {
            return fetch_by_ids(engine, ids).await;
        }
    }

    // 5. Full scan, narrowed to the type subtree.
    engine.scan_type(Some(node_type)).await
}

fn find_type_leaf(filter: &Filter) -> Option<String> {
    match filter {
        Filter::Leaf { field, operator, value } if field == "type" && *operator == Operator::Eq => {
            value.as_str().map(String::from)
        }
        Filter::And(children) => children.iter().find_map(find_type_leaf),
        _ => None,
    }
}

async fn fetch_candidates_by_scan<B: BlobBackend>(engine: &GraphEngine<B>, node_type: Option<&str>) -> Result<Vec<Node>> {
    engine.scan_type(node_type).await
}

async fn fetch_by_ids<B: BlobBackend>(engine: &GraphEngine<B>, ids: HashSet<String>) -> Result<Vec<Node>> {
    let mut nodes = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(node) = engine.fetch_node(&id).await? {
            nodes.push(node);
        }
    }
    Ok(nodes)
}

/// Stable comparison across the `sort` list. Absent or mixed-type
/// comparisons treat the node missing the field as sorting last,
/// regardless of direction — never a panic.
fn compare_nodes(a: &Node, b: &Node, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let av = resolve_field(a, &key.field);
        let bv = resolve_field(b, &key.field);
        let ord = match (&av, &bv) {
            (Some(av), Some(bv)) => {
                let raw = av.partial_ordering(bv).unwrap_or(Ordering::Equal);
                if key.direction == SortDirection::Desc {
                    raw.reverse()
                } else {
                    raw
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub async fn execute<B: BlobBackend>(engine: &GraphEngine<B>, spec: &QuerySpec, ctx: &AuthContext) -> Result<QueryOutput> {
    let candidates = plan_candidates(engine, spec.filter.as_ref()).await?;

    let mut matched: Vec<Node> = candidates
        .into_iter()
        .filter(|node| can_access(node, ctx))
        .filter(|node| spec.filter.as_ref().map(|f| matches_filter(node, f)).unwrap_or(true))
        .collect();

    matched.sort_by(|a, b| compare_nodes(a, b, &spec.sort));

    let total = matched.len();
    let default_limit = engine.config().default_query_limit;
    let max_limit = engine.config().max_query_limit;
    let (offset, limit) = match spec.pagination {
        Some(p) => (p.offset, p.limit.unwrap_or(default_limit).min(max_limit)),
        None => (0, default_limit.min(max_limit)),
    };

    let items: Vec<Node> = matched.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + items.len() < total;

    Ok(QueryOutput { items, total, has_more })
}
