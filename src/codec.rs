//! Canonical JSON codec. Pretty-printed with a
//! two-space indent; the decoder rejects missing required fields but
//! tolerates unknown extra ones (serde's default struct behavior already
//! gives us this — we do not set `deny_unknown_fields`).

use crate::error::{Error, Result};
use crate::model::{Node, Relationship};
use serde::Serialize;

const INDENT: &[u8] = b"  ";

fn pretty_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(Error::Codec)?;
    Ok(buf)
}

pub fn encode_node(node: &Node) -> Result<Vec<u8>> {
    pretty_bytes(node)
}

pub fn decode_node(bytes: &[u8]) -> Result<Node> {
    serde_json::from_slice(bytes).map_err(Error::Codec)
}

pub fn encode_relationship(rel: &Relationship) -> Result<Vec<u8>> {
    pretty_bytes(rel)
}

pub fn decode_relationship(bytes: &[u8]) -> Result<Relationship> {
    serde_json::from_slice(bytes).map_err(Error::Codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn node_roundtrip() {
        let node = Node::new("u1", "user")
            .with_property("name", Value::from("Alice"))
            .with_property("age", Value::Int(28));
        let bytes = encode_node(&node).unwrap();
        let decoded = decode_node(&bytes).unwrap();
        assert_eq!(node, decoded);
    }

    #[test]
    fn pretty_printed_two_space_indent() {
        let node = Node::new("u1", "user");
        let bytes = encode_node(&node).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n  \"id\""));
    }

    #[test]
    fn decode_tolerates_unknown_extra_fields() {
        let text = r#"{"id":"u1","type":"user","properties":{},"version":1,"extra_field":"ignored"}"#;
        let node = decode_node(text.as_bytes()).unwrap();
        assert_eq!(node.id, "u1");
    }

    #[test]
    fn decode_fails_on_missing_required_field() {
        let text = r#"{"id":"u1","properties":{},"version":1}"#;
        assert!(decode_node(text.as_bytes()).is_err());
    }

    #[test]
    fn relationship_roundtrip() {
        let rel = Relationship::new("a", "b", "FOLLOWS").with_property("since", Value::Int(2020));
        let bytes = encode_relationship(&rel).unwrap();
        let decoded = decode_relationship(&bytes).unwrap();
        assert_eq!(rel, decoded);
    }
}
