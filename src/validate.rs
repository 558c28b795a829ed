//! Validator — structural checks run before anything touches the
//! cache or the backend. Purely synchronous, no I/O.

use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::model::{Node, Relationship, Value};

/// Ids are caller-supplied or UUIDv4-assigned; either way they must match
/// this shape so they're always safe to embed in a shard/blob key.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_type(type_name: &str) -> Result<()> {
    if type_name.trim().is_empty() {
        return Err(Error::Validation("type must not be empty".into()));
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<()> {
    if !is_valid_id(id) {
        return Err(Error::Validation(format!(
            "invalid id {id:?}: must be 1-128 characters of [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

/// Reject values JSON cannot represent losslessly: non-finite floats.
/// Everything else in `Value` is already JSON-shaped by construction.
fn validate_value(value: &Value) -> Result<()> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(Error::Validation(format!(
            "property value {f} is not finite and cannot be stored as JSON"
        ))),
        Value::List(items) => items.iter().try_for_each(validate_value),
        Value::Map(map) => map.values().try_for_each(validate_value),
        _ => Ok(()),
    }
}

pub fn validate_node(node: &Node) -> Result<()> {
    validate_type(&node.node_type)?;
    validate_id(&node.id)?;
    for v in node.properties.values() {
        validate_value(v)?;
    }
    Ok(())
}

pub fn validate_relationship(rel: &Relationship, cfg: &GraphConfig) -> Result<()> {
    validate_type(&rel.rel_type)?;
    validate_id(&rel.from)?;
    validate_id(&rel.to)?;
    if cfg.forbid_self_loops && rel.from == rel.to {
        return Err(Error::Validation(format!(
            "self-loop rejected: {} -> {}",
            rel.from, rel.to
        )));
    }
    for v in rel.properties.values() {
        validate_value(v)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_type_is_rejected() {
        let node = Node::new("n1", "");
        assert!(validate_node(&node).is_err());
    }

    #[test]
    fn malformed_id_is_rejected() {
        let node = Node::new("has space", "user");
        assert!(validate_node(&node).is_err());
    }

    #[test]
    fn well_formed_node_passes() {
        let node = Node::new("user-42_A", "user");
        assert!(validate_node(&node).is_ok());
    }

    #[test]
    fn non_finite_property_is_rejected() {
        let node = Node::new("n1", "user").with_property("score", Value::Float(f64::NAN));
        assert!(validate_node(&node).is_err());
    }

    #[test]
    fn self_loop_rejected_only_when_configured() {
        let rel = Relationship::new("a", "a", "KNOWS");
        let mut cfg = GraphConfig::default();
        assert!(validate_relationship(&rel, &cfg).is_ok());
        cfg.forbid_self_loops = true;
        assert!(validate_relationship(&rel, &cfg).is_err());
    }
}
