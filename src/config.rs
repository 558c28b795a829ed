//! Engine configuration — the declared values the core recognises.

use serde::{Deserialize, Serialize};

/// Which deterministic placement function the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardStrategy {
    Hash,
    Range,
    Date,
}

impl Default for ShardStrategy {
    fn default() -> Self {
        ShardStrategy::Hash
    }
}

/// Granularity for the `date` sharding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateFormat {
    #[serde(rename = "YYYY")]
    Year,
    #[serde(rename = "YYYY-MM")]
    YearMonth,
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat::YearMonth
    }
}

/// One compound index declaration: a type plus an ordered list of property
/// paths whose combined value is the index key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundIndexSpec {
    pub node_type: String,
    pub properties: Vec<String>,
}

/// Declares which property paths are indexed for equality/range lookups,
/// and which compound combinations are tracked. Unindexed queries fall
/// through to a backend scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// `(type, property_path)` pairs tracked for equality lookup.
    #[serde(default)]
    pub equality: Vec<(String, String)>,
    /// `(type, property_path)` pairs tracked for range lookup. Must be a
    /// subset of types whose values are numeric/ordinal.
    #[serde(default)]
    pub range: Vec<(String, String)>,
    /// Compound-key indexes.
    #[serde(default)]
    pub compound: Vec<CompoundIndexSpec>,
}

impl IndexSpec {
    pub fn has_equality(&self, node_type: &str, property: &str) -> bool {
        self.equality
            .iter()
            .any(|(t, p)| t == node_type && p == property)
    }

    pub fn has_range(&self, node_type: &str, property: &str) -> bool {
        self.range
            .iter()
            .any(|(t, p)| t == node_type && p == property)
    }

    /// Find a compound index on `node_type` whose property set exactly
    /// matches `properties` (order-insensitive).
    pub fn find_compound(&self, node_type: &str, properties: &[String]) -> Option<&CompoundIndexSpec> {
        self.compound.iter().find(|spec| {
            spec.node_type == node_type
                && spec.properties.len() == properties.len()
                && properties.iter().all(|p| spec.properties.contains(p))
        })
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub shard_strategy: ShardStrategy,
    pub shard_count: u64,
    pub range_size: u64,
    pub date_format: DateFormat,
    pub shard_levels: u32,
    pub index_spec: IndexSpec,
    pub cache_capacity: usize,
    pub default_query_limit: usize,
    pub max_query_limit: usize,
    /// Open question resolved: self-loops are allowed unless this is set.
    pub forbid_self_loops: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            shard_strategy: ShardStrategy::default(),
            shard_count: 10,
            range_size: 1000,
            date_format: DateFormat::default(),
            shard_levels: 2,
            index_spec: IndexSpec::default(),
            cache_capacity: 10_000,
            default_query_limit: 100,
            max_query_limit: 1000,
            forbid_self_loops: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = GraphConfig::default();
        assert_eq!(cfg.shard_count, 10);
        assert_eq!(cfg.range_size, 1000);
        assert_eq!(cfg.shard_levels, 2);
        assert_eq!(cfg.cache_capacity, 10_000);
        assert_eq!(cfg.default_query_limit, 100);
        assert_eq!(cfg.max_query_limit, 1000);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = GraphConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GraphConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.shard_count, back.shard_count);
    }
}
