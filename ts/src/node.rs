//! Tag tree model

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;
use tracing::warn;

/// A node in a namespace's tag tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagNode {
    /// A literal prompt fragment
    Leaf(String),
    /// An anonymous pool, picked without replacement
    Sequence(Vec<TagNode>),
    /// A named pool, picked by value without replacement
    Mapping(BTreeMap<String, TagNode>),
}

impl TagNode {
    /// Build a node from any parsed YAML value
    ///
    /// Scalars become leaves holding their YAML text, `null` becomes an empty
    /// pool and tags are looked through. Mapping keys that are not scalars are
    /// dropped with a warning.
    pub fn from_yaml(value: Value) -> Self {
        match value {
            Value::Null => TagNode::Sequence(Vec::new()),
            Value::Bool(b) => TagNode::Leaf(b.to_string()),
            Value::Number(n) => TagNode::Leaf(n.to_string()),
            Value::String(s) => TagNode::Leaf(s),
            Value::Sequence(items) => TagNode::Sequence(items.into_iter().map(TagNode::from_yaml).collect()),
            Value::Mapping(mapping) => {
                let mut entries = BTreeMap::new();
                for (key, value) in mapping {
                    match scalar_key(key) {
                        Some(key) => {
                            entries.insert(key, TagNode::from_yaml(value));
                        }
                        None => warn!("Skipping tag entry with a non-scalar key"),
                    }
                }
                TagNode::Mapping(entries)
            }
            Value::Tagged(tagged) => TagNode::from_yaml(tagged.value),
        }
    }

    pub fn is_pool(&self) -> bool {
        !matches!(self, TagNode::Leaf(_))
    }

    /// Number of pickable entries (1 for a leaf)
    pub fn len(&self) -> usize {
        match self {
            TagNode::Leaf(_) => 1,
            TagNode::Sequence(items) => items.len(),
            TagNode::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Child mapping entry by key
    pub fn child(&self, key: &str) -> Option<&TagNode> {
        match self {
            TagNode::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }
}

impl From<&str> for TagNode {
    fn from(s: &str) -> Self {
        TagNode::Leaf(s.to_string())
    }
}

fn scalar_key(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_key(tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> TagNode {
        TagNode::from_yaml(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_nested_shapes() {
        let node = parse(
            r#"
hair:
  - long hair
  - short hair
eyes:
  blue: blue eyes
  red: red eyes
"#,
        );

        let hair = node.child("hair").unwrap();
        assert_eq!(
            hair,
            &TagNode::Sequence(vec!["long hair".into(), "short hair".into()])
        );
        assert_eq!(node.child("eyes").unwrap().child("red"), Some(&TagNode::from("red eyes")));
        assert!(node.child("missing").is_none());
    }

    #[test]
    fn test_scalars_become_leaves() {
        let node = parse("[8k, 2, true, 1.5]");
        assert_eq!(
            node,
            TagNode::Sequence(vec!["8k".into(), "2".into(), "true".into(), "1.5".into()])
        );
    }

    #[test]
    fn test_null_is_empty_pool() {
        let node = parse("empty:");
        let empty = node.child("empty").unwrap();
        assert!(empty.is_pool());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        let node = parse("1: one\n2: two");
        assert_eq!(node.child("2"), Some(&TagNode::from("two")));
    }

    #[test]
    fn test_leaf_is_not_a_pool() {
        let leaf = TagNode::from("masterpiece");
        assert!(!leaf.is_pool());
        assert_eq!(leaf.len(), 1);
        assert!(leaf.child("anything").is_none());
    }

    #[test]
    fn test_serializes_back_to_plain_yaml() {
        let node = parse("colors: [red, blue]");
        let yaml = serde_yaml::to_string(&node).unwrap();
        assert!(yaml.contains("colors:"));
        assert!(yaml.contains("- red"));
    }
}
