//! PropertyMap — the key-value store on nodes and relationships.

use super::Value;
use hashbrown::HashMap;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Convert iterator of (key, value) pairs into a PropertyMap-shaped Value.
impl<K, V> From<Vec<(K, V)>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Shallow-merge `patch` into `base`: keys present in `patch` overwrite
/// `base`, keys absent from `patch` are left untouched. This is the
/// "merge patch.properties (shallow replace)" contract used by
/// `updateNode`/`updateRelationship`.
pub fn merge_shallow(base: &mut PropertyMap, patch: PropertyMap) {
    for (k, v) in patch {
        base.insert(k, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_merge_overwrites_only_patched_keys() {
        let mut base: PropertyMap = HashMap::from_iter([
            ("name".to_string(), Value::from("Alice")),
            ("age".to_string(), Value::Int(28)),
        ]);
        let patch: PropertyMap = HashMap::from_iter([("age".to_string(), Value::Int(29))]);
        merge_shallow(&mut base, patch);
        assert_eq!(base.get("age"), Some(&Value::Int(29)));
        assert_eq!(base.get("name"), Some(&Value::from("Alice")));
    }
}
