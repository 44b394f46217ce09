//! Output records built from retrieved documents

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

use crate::document::Document;
use crate::metadata::{self, OwnerReference};
use crate::scheduling::{
    self, ContainerResources, FieldView, PriorityInfo, RuntimeInfo, SchedulingField,
    SchedulingSnapshot,
};

/// What to report about each object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Labels,
    Annotations,
    Owner,
    Scheduling,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Labels => "labels",
            Command::Annotations => "annotations",
            Command::Owner => "owner",
            Command::Scheduling => "scheduling",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One object in the output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_references: Option<Vec<OwnerReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<SchedulingSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Map<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ContainerResources>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_spread_constraints: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeInfo>,
}

impl OutputItem {
    fn set_field(&mut self, view: FieldView) {
        match view {
            FieldView::Tolerations(v) => self.tolerations = Some(v),
            FieldView::Affinity(v) => self.affinity = Some(v),
            FieldView::NodeSelector(v) => self.node_selector = Some(v),
            FieldView::Resources(v) => self.resources = Some(v),
            FieldView::Topology(v) => self.topology_spread_constraints = Some(v),
            FieldView::Priority(v) => self.priority = Some(v),
            FieldView::Runtime(v) => self.runtime = Some(v),
        }
    }
}

/// Complete output document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Output {
    pub items: Vec<OutputItem>,
}

impl FromIterator<OutputItem> for Output {
    fn from_iter<I: IntoIterator<Item = OutputItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Build the output record of one object
///
/// `namespaced` is the scope of the resolved type; cluster-scoped objects
/// never report a namespace. `field` narrows the scheduling command.
pub fn build_item(
    doc: &Document,
    command: Command,
    field: Option<SchedulingField>,
    namespaced: bool,
) -> OutputItem {
    let mut item = OutputItem {
        name: doc.name().to_string(),
        namespace: doc
            .namespace()
            .filter(|_| namespaced)
            .map(str::to_string),
        ..Default::default()
    };

    match command {
        Command::Labels => item.labels = Some(metadata::labels(doc)),
        Command::Annotations => item.annotations = Some(metadata::annotations(doc)),
        Command::Owner => {
            let owners = metadata::owner_references(doc);
            item.owner_references = (!owners.is_empty()).then_some(owners);
        }
        Command::Scheduling => match field {
            None => item.scheduling = scheduling::extract_scheduling_snapshot(doc),
            Some(field) => {
                if let Some(view) = scheduling::extract_field(doc, field) {
                    item.set_field(view);
                }
            }
        },
    }

    item
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
  labels:
    app: web
  ownerReferences:
    - kind: StatefulSet
      name: web
spec:
  tolerations:
    - key: dedicated
  priority: 5
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_labels_item() {
        let item = build_item(&pod(), Command::Labels, None, true);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"name": "web-0", "namespace": "prod", "labels": {"app": "web"}})
        );
    }

    #[test]
    fn test_cluster_scoped_has_no_namespace() {
        let item = build_item(&pod(), Command::Annotations, None, false);
        assert_eq!(item.namespace, None);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"name": "web-0", "annotations": {}})
        );
    }

    #[test]
    fn test_owner_item() {
        let item = build_item(&pod(), Command::Owner, None, true);
        let owners = item.owner_references.unwrap();
        assert_eq!(owners[0].kind, "StatefulSet");
        assert_eq!(owners[0].namespace.as_deref(), Some("prod"));

        let orphan = Document::new(json!({"metadata": {"name": "lonely"}}));
        let item = build_item(&orphan, Command::Owner, None, true);
        assert!(item.owner_references.is_none());
    }

    #[test]
    fn test_scheduling_items() {
        let item = build_item(&pod(), Command::Scheduling, None, true);
        let snapshot = item.scheduling.unwrap();
        assert_eq!(snapshot.priority, Some(5));

        let item = build_item(
            &pod(),
            Command::Scheduling,
            Some(SchedulingField::Tolerations),
            true,
        );
        assert!(item.scheduling.is_none());
        assert_eq!(item.tolerations, Some(vec![json!({"key": "dedicated"})]));

        let item = build_item(&pod(), Command::Scheduling, Some(SchedulingField::Affinity), true);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"name": "web-0", "namespace": "prod"})
        );
    }

    #[test]
    fn test_output_collects() {
        let output: Output = vec![OutputItem::default()].into_iter().collect();
        assert_eq!(output.items.len(), 1);
    }
}
