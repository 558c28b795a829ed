//! Helpers for turning a `Value` into index keys.

use crate::model::Value;
use std::cmp::Ordering;

/// Canonical string form of a scalar value, used as the key in the
/// equality and compound indexes. `None` for list/map values — those
/// aren't indexable leaves.
pub fn canonical_key(value: &Value) -> Option<String> {
    match value {
        Value::List(_) | Value::Map(_) => None,
        _ => serde_json::to_string(value).ok(),
    }
}

/// Total-ordered wrapper over `f64` for the range index's `BTreeMap` key.
/// `f64::total_cmp` gives a consistent order (including for NaN, which we
/// never expect to see as a stored property but must not panic on).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedF64(pub f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Extract the numeric value usable as a range-index key, if any.
pub fn range_key(value: &Value) -> Option<OrderedF64> {
    value.as_f64().map(OrderedF64)
}
