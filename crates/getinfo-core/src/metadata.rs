//! Object metadata: labels, annotations and owner references

use serde::Serialize;
use std::collections::BTreeMap;

use crate::document::{Document, Node};

/// A reference to an object that owns another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub kind: String,
    pub name: String,
}

/// `metadata.labels` (empty when missing or malformed)
pub fn labels(doc: &Document) -> BTreeMap<String, String> {
    string_map(doc, "labels")
}

/// `metadata.annotations` (empty when missing or malformed)
pub fn annotations(doc: &Document) -> BTreeMap<String, String> {
    string_map(doc, "annotations")
}

fn string_map(doc: &Document, key: &str) -> BTreeMap<String, String> {
    doc.at(&["metadata", key])
        .and_then(Node::as_string_map)
        .unwrap_or_default()
}

/// Owner references of an object
///
/// A reference without a namespace gets the namespace of the object itself.
pub fn owner_references(doc: &Document) -> Vec<OwnerReference> {
    let Some(refs) = doc
        .at(&["metadata", "ownerReferences"])
        .and_then(Node::as_slice)
    else {
        return Vec::new();
    };

    refs.iter()
        .map(Node::from)
        .filter(|r| r.as_map().is_some())
        .map(|r| {
            let text = |key: &str| r.get(key).and_then(Node::as_str).unwrap_or_default();
            let namespace = r
                .get("namespace")
                .and_then(Node::non_empty_str)
                .or_else(|| doc.namespace());
            OwnerReference {
                namespace: namespace.map(str::to_string),
                kind: text("kind").to_string(),
                name: text("name").to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels_and_annotations() {
        let doc = Document::from_yaml(
            r#"
metadata:
  name: web
  labels:
    app: web
    tier: frontend
  annotations:
    note: hello
"#,
        )
        .unwrap();

        let labels = labels(&doc);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["tier"], "frontend");
        assert_eq!(annotations(&doc)["note"], "hello");
    }

    #[test]
    fn test_missing_labels_are_empty() {
        let doc = Document::new(json!({"metadata": {"name": "x"}}));
        assert!(labels(&doc).is_empty());
        assert!(annotations(&doc).is_empty());
    }

    #[test]
    fn test_owner_references_inherit_namespace() {
        let doc = Document::from_yaml(
            r#"
metadata:
  name: web-abc12
  namespace: prod
  ownerReferences:
    - apiVersion: apps/v1
      kind: ReplicaSet
      name: web-6d4f
    - kind: Widget
      name: other
      namespace: elsewhere
    - not-a-reference
"#,
        )
        .unwrap();

        let owners = owner_references(&doc);
        assert_eq!(
            owners,
            vec![
                OwnerReference {
                    namespace: Some("prod".to_string()),
                    kind: "ReplicaSet".to_string(),
                    name: "web-6d4f".to_string(),
                },
                OwnerReference {
                    namespace: Some("elsewhere".to_string()),
                    kind: "Widget".to_string(),
                    name: "other".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_cluster_scoped_owner_has_no_namespace() {
        let doc = Document::new(json!({
            "metadata": {
                "name": "pv-1",
                "ownerReferences": [{"kind": "StorageClass", "name": "fast"}]
            }
        }));
        let owners = owner_references(&doc);
        assert_eq!(owners[0].namespace, None);
        assert_eq!(
            serde_json::to_value(&owners[0]).unwrap(),
            json!({"kind": "StorageClass", "name": "fast"})
        );
    }
}
