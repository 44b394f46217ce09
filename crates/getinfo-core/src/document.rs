//! Loosely-typed cluster objects
//!
//! A [`Document`] is a retrieved object kept as a raw JSON tree. Objects of
//! custom kinds or newer API versions have no static type, so every read goes
//! through [`Node`], whose accessors return `None` for missing keys and for
//! values of the wrong shape alike.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::error::Result;

/// A retrieved object as a generic JSON tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(JsonValue);

impl Document {
    /// Wrap an existing JSON value
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// Parse a document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Ok(Self(value))
    }

    /// Root node of the tree
    pub fn root(&self) -> Node<'_> {
        Node(&self.0)
    }

    /// Node at the given path, if every segment exists
    pub fn at(&self, path: &[&str]) -> Option<Node<'_>> {
        self.root().path(path)
    }

    /// Declared `kind` of the object
    pub fn kind(&self) -> Option<&str> {
        self.root().get("kind")?.as_str()
    }

    /// `metadata.name` (empty when missing)
    pub fn name(&self) -> &str {
        self.at(&["metadata", "name"])
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    /// `metadata.namespace`, if set and non-empty
    pub fn namespace(&self) -> Option<&str> {
        self.at(&["metadata", "namespace"])
            .and_then(|n| n.as_str())
            .filter(|ns| !ns.is_empty())
    }

}

/// Borrowed view into a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a>(&'a JsonValue);

impl<'a> From<&'a JsonValue> for Node<'a> {
    fn from(value: &'a JsonValue) -> Self {
        Node(value)
    }
}

impl<'a> Node<'a> {
    /// Member of a mapping node
    pub fn get(self, key: &str) -> Option<Node<'a>> {
        match self.0 {
            JsonValue::Object(map) => map.get(key).map(Node),
            _ => None,
        }
    }

    /// Follow a sequence of mapping keys
    pub fn path(self, path: &[&str]) -> Option<Node<'a>> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.0.as_str()
    }

    pub fn as_bool(self) -> Option<bool> {
        self.0.as_bool()
    }

    /// Integer value; floats and out-of-range numbers are not integers
    pub fn as_i64(self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_map(self) -> Option<&'a Map<String, JsonValue>> {
        self.0.as_object()
    }

    pub fn as_slice(self) -> Option<&'a [JsonValue]> {
        self.0.as_array().map(Vec::as_slice)
    }

    /// Mapping whose values are all strings
    ///
    /// A single non-string value makes the whole mapping unreadable.
    pub fn as_string_map(self) -> Option<BTreeMap<String, String>> {
        self.as_map()?
            .iter()
            .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    /// Non-empty string
    pub fn non_empty_str(self) -> Option<&'a str> {
        self.as_str().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod() -> Document {
        Document::from_yaml(
            r#"
apiVersion: v1
kind: Pod
metadata:
  name: web-0
  namespace: prod
spec:
  priority: 0
  nodeSelector:
    disk: ssd
  containers:
    - name: app
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_basic_accessors() {
        let doc = pod();
        assert_eq!(doc.kind(), Some("Pod"));
        assert_eq!(doc.name(), "web-0");
        assert_eq!(doc.namespace(), Some("prod"));
    }

    #[test]
    fn test_from_json() {
        let doc = Document::from_json(r#"{"kind":"Node","metadata":{"name":"n1"}}"#).unwrap();
        assert_eq!(doc.kind(), Some("Node"));
        assert_eq!(doc.name(), "n1");
        assert!(Document::from_json("{").is_err());
    }

    #[test]
    fn test_missing_metadata() {
        let doc = Document::new(json!({"kind": "Node"}));
        assert_eq!(doc.name(), "");
        assert_eq!(doc.namespace(), None);

        let doc = Document::new(json!({"metadata": {"namespace": ""}}));
        assert_eq!(doc.namespace(), None);
        assert_eq!(doc.kind(), None);
    }

    #[test]
    fn test_path_through_non_mapping() {
        let doc = pod();
        // containers is a sequence, it has no "name" member
        assert!(doc.at(&["spec", "containers", "name"]).is_none());
        assert!(doc.at(&["spec", "missing", "deeper"]).is_none());
        assert!(doc.at(&[]).is_some());
    }

    #[test]
    fn test_typed_accessors_reject_wrong_shapes() {
        let doc = pod();
        let priority = doc.at(&["spec", "priority"]).unwrap();
        assert_eq!(priority.as_i64(), Some(0));
        assert_eq!(priority.as_str(), None);
        assert_eq!(priority.as_bool(), None);

        let containers = doc.at(&["spec", "containers"]).unwrap();
        assert_eq!(containers.as_slice().map(<[_]>::len), Some(1));
        assert!(containers.as_map().is_none());
    }

    #[test]
    fn test_string_map() {
        let doc = pod();
        let selector = doc.at(&["spec", "nodeSelector"]).unwrap().as_string_map().unwrap();
        assert_eq!(selector.get("disk").map(String::as_str), Some("ssd"));

        let mixed = Document::new(json!({"m": {"a": "x", "b": 1}}));
        assert!(mixed.at(&["m"]).unwrap().as_string_map().is_none());
    }

    #[test]
    fn test_float_is_not_integer() {
        let doc = Document::new(json!({"p": 1.5}));
        assert_eq!(doc.at(&["p"]).unwrap().as_i64(), None);
    }

    #[test]
    fn test_non_empty_str() {
        let doc = Document::new(json!({"a": "", "b": "x"}));
        assert_eq!(doc.at(&["a"]).unwrap().non_empty_str(), None);
        assert_eq!(doc.at(&["b"]).unwrap().non_empty_str(), Some("x"));
    }
}
