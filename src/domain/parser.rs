//! Construction of trees from nested JSON mappings.
//!
//! `parse` only builds detached trees; wiring them together is left to
//! [`Tree::add_child`], so the assembly policy (duplicate rejection) lives in
//! one place.

use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::arena::{Payload, Tree};
use crate::domain::error::{DomainError, TreeResult};

/// Build one detached tree per key of `config`.
///
/// A `null` (or empty object) value marks a leaf, an object value is parsed
/// recursively and its trees are attached as children. Any other value is
/// rejected as malformed.
#[instrument(level = "trace", skip(config), fields(keys = config.len()))]
pub fn parse(config: &Map<String, Value>) -> TreeResult<Vec<Tree>> {
    let mut nodes = Vec::with_capacity(config.len());

    for (name, value) in config {
        let mut node = Tree::new(name)?;
        match value {
            Value::Null => {}
            Value::Object(children) => {
                let root = node.root();
                for child in parse(children)? {
                    node.add_child(root, child)?;
                }
            }
            other => {
                return Err(DomainError::MalformedInput(format!(
                    "node '{}' must map to an object or null, found {}",
                    name,
                    kind(other)
                )))
            }
        }
        nodes.push(node);
    }

    Ok(nodes)
}

/// Build the tree described by a single-key JSON object.
pub fn load_value(value: Value) -> TreeResult<Tree> {
    let config = match value {
        Value::Object(config) => config,
        other => {
            return Err(DomainError::MalformedInput(format!(
                "top level must be an object, found {}",
                kind(&other)
            )))
        }
    };
    if config.len() != 1 {
        return Err(DomainError::MalformedInput(format!(
            "expected exactly one root key, found {}",
            config.len()
        )));
    }

    let tree = parse(&config)?
        .pop()
        .ok_or_else(|| DomainError::MalformedInput("no root node produced".to_string()))?;
    debug!("loaded tree with {} nodes", tree.len());
    Ok(tree)
}

/// Parse JSON text and build its tree, see [`load_value`].
pub fn load_str(source: &str) -> TreeResult<Tree> {
    let value: Value =
        serde_json::from_str(source).map_err(|e| DomainError::MalformedInput(e.to_string()))?;
    load_value(value)
}

/// Parse a payload: a JSON object mapping dotted paths to numbers or null.
pub fn payload_from_str(source: &str) -> TreeResult<Payload> {
    serde_json::from_str(source)
        .map_err(|e| DomainError::MalformedInput(format!("payload: {}", e)))
}

impl FromStr for Tree {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        load_str(s)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_parse_returns_one_tree_per_key() {
        let config = json!({"a": null, "b": {"c": null, "d": {}}});
        let trees = parse(config.as_object().unwrap()).unwrap();

        assert_eq!(trees.len(), 2);
        let b = trees.iter().find(|t| t[t.root()].name() == "b").unwrap();
        assert_eq!(b.len(), 3);
        assert!(b[b.get("d").unwrap()].is_leaf());
    }

    #[test]
    fn test_load_str_single_root() {
        let tree = load_str(r#"{"rack1": {"sg1": {"cmp1": null}, "sg2": {"ckt1": null}}}"#).unwrap();
        assert_eq!(tree[tree.root()].name(), "rack1");
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.id(tree.get("sg2.ckt1").unwrap()).unwrap(), "rack1.sg2.ckt1");
    }

    #[test]
    fn test_from_str_trait() {
        let tree: Tree = r#"{"root": null}"#.parse().unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[rstest]
    #[case::two_roots(r#"{"a": null, "b": null}"#)]
    #[case::no_root(r#"{}"#)]
    #[case::array(r#"[{"a": null}]"#)]
    #[case::scalar_child(r#"{"a": {"b": 3}}"#)]
    #[case::string_child(r#"{"a": {"b": "leaf"}}"#)]
    #[case::not_json(r#"{"a": "#)]
    fn test_load_str_malformed(#[case] source: &str) {
        let err = load_str(source).unwrap_err();
        assert!(
            matches!(err, DomainError::MalformedInput(_)),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_load_str_rejects_empty_name() {
        let err = load_str(r#"{"root": {"": null}}"#).unwrap_err();
        assert_eq!(err, DomainError::InvalidName(String::new()));
    }

    #[test]
    fn test_payload_from_str() {
        let payload = payload_from_str(r#"{"a.b": 10, "a.c": null, "a.d": 2.5}"#).unwrap();
        assert_eq!(payload["a.b"], Some(10.0));
        assert_eq!(payload["a.c"], None);
        assert_eq!(payload["a.d"], Some(2.5));

        assert!(payload_from_str(r#"{"a.b": "ten"}"#).is_err());
    }
}
