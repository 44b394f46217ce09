//! Scheduling field extraction
//!
//! Pods carry their scheduling fields under `spec`. Workload controllers wrap
//! a pod template and carry them under `spec.template.spec`. Every other kind
//! is read at `spec` and simply yields nothing when the fields live elsewhere.
//!
//! Extraction never fails: missing keys and wrong-typed values both read as
//! "absent".

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::document::{Document, Node};
use crate::error::CoreError;

const POD_SPEC: &[&str] = &["spec"];
const TEMPLATE_POD_SPEC: &[&str] = &["spec", "template", "spec"];

/// Kinds whose pod spec is nested under a template.
///
/// CronJob is listed with the same template path as the other controllers
/// even though its pod template actually sits under `spec.jobTemplate`.
const TEMPLATE_KINDS: &[&str] = &[
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Job",
    "CronJob",
];

/// Path to the pod-level scheduling fields inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation(&'static [&'static str]);

impl FieldLocation {
    pub fn path(&self) -> &'static [&'static str] {
        self.0
    }

    /// Node at this location in the document
    pub fn find<'a>(&self, doc: &'a Document) -> Option<Node<'a>> {
        doc.at(self.0)
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Location of the pod spec for a declared kind
pub fn locate_spec_root(kind: &str) -> FieldLocation {
    if TEMPLATE_KINDS.iter().any(|k| *k == kind) {
        FieldLocation(TEMPLATE_POD_SPEC)
    } else {
        FieldLocation(POD_SPEC)
    }
}

/// All scheduling-relevant fields of one object
///
/// `None` means the field was missing, empty or malformed on the object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Map<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_spread_constraints: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_requests: Option<BTreeMap<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<BTreeMap<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preemption_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_class_name: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub host_network: bool,
    #[serde(rename = "hostPID", skip_serializing_if = "is_false")]
    pub host_pid: bool,
    #[serde(rename = "hostIPC", skip_serializing_if = "is_false")]
    pub host_ipc: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SchedulingSnapshot {
    /// True when no field carries information
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Requests and limits declared by a single container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerResources {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<Map<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Map<String, JsonValue>>,
}

/// Priority-related fields, each present independently
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preemption_policy: Option<String>,
}

/// Runtime-related fields; booleans are kept only when declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,
    #[serde(rename = "hostPID", skip_serializing_if = "Option::is_none")]
    pub host_pid: Option<bool>,
    #[serde(rename = "hostIPC", skip_serializing_if = "Option::is_none")]
    pub host_ipc: Option<bool>,
}

/// One of the field groups that can be extracted on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingField {
    Tolerations,
    Affinity,
    NodeSelector,
    Resources,
    Topology,
    Priority,
    Runtime,
}

impl SchedulingField {
    pub const ALL: [SchedulingField; 7] = [
        SchedulingField::Tolerations,
        SchedulingField::Affinity,
        SchedulingField::NodeSelector,
        SchedulingField::Resources,
        SchedulingField::Topology,
        SchedulingField::Priority,
        SchedulingField::Runtime,
    ];

    /// Name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingField::Tolerations => "tolerations",
            SchedulingField::Affinity => "affinity",
            SchedulingField::NodeSelector => "nodeselector",
            SchedulingField::Resources => "resources",
            SchedulingField::Topology => "topology",
            SchedulingField::Priority => "priority",
            SchedulingField::Runtime => "runtime",
        }
    }

    /// One-line description for help output
    pub fn description(&self) -> &'static str {
        match self {
            SchedulingField::Tolerations => "List only tolerations",
            SchedulingField::Affinity => "List only affinity rules",
            SchedulingField::NodeSelector => "List only nodeSelector",
            SchedulingField::Resources => "List only resource requests/limits",
            SchedulingField::Topology => "List only topologySpreadConstraints",
            SchedulingField::Priority => "List only priority-related fields",
            SchedulingField::Runtime => {
                "List only runtime-related fields (runtimeClassName, hostNetwork, etc.)"
            }
        }
    }
}

impl fmt::Display for SchedulingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownField {
                name: s.to_string(),
                expected: Self::ALL.map(|f| f.as_str()).join(", "),
            })
    }
}

/// Result of a single-field extraction
#[derive(Debug, Clone, PartialEq)]
pub enum FieldView {
    Tolerations(Vec<JsonValue>),
    Affinity(Map<String, JsonValue>),
    NodeSelector(BTreeMap<String, String>),
    Resources(Vec<ContainerResources>),
    Topology(Vec<JsonValue>),
    Priority(PriorityInfo),
    Runtime(RuntimeInfo),
}

impl FieldView {
    pub fn field(&self) -> SchedulingField {
        match self {
            FieldView::Tolerations(_) => SchedulingField::Tolerations,
            FieldView::Affinity(_) => SchedulingField::Affinity,
            FieldView::NodeSelector(_) => SchedulingField::NodeSelector,
            FieldView::Resources(_) => SchedulingField::Resources,
            FieldView::Topology(_) => SchedulingField::Topology,
            FieldView::Priority(_) => SchedulingField::Priority,
            FieldView::Runtime(_) => SchedulingField::Runtime,
        }
    }
}

/// Typed reads relative to the pod spec root
#[derive(Clone, Copy)]
struct SpecRoot<'a>(Option<Node<'a>>);

impl<'a> SpecRoot<'a> {
    fn of(doc: &'a Document) -> Self {
        let location = locate_spec_root(doc.kind().unwrap_or_default());
        Self(location.find(doc))
    }

    fn get(self, key: &str) -> Option<Node<'a>> {
        self.0?.get(key)
    }

    fn string(self, key: &str) -> Option<String> {
        self.get(key)?.non_empty_str().map(str::to_string)
    }

    fn string_map(self, key: &str) -> Option<BTreeMap<String, String>> {
        self.get(key)?.as_string_map().filter(|m| !m.is_empty())
    }

    fn map(self, key: &str) -> Option<Map<String, JsonValue>> {
        self.get(key)?.as_map().filter(|m| !m.is_empty()).cloned()
    }

    fn sequence(self, key: &str) -> Option<Vec<JsonValue>> {
        self.get(key)?
            .as_slice()
            .filter(|s| !s.is_empty())
            .map(<[JsonValue]>::to_vec)
    }

    /// Present whenever the key holds an integer, zero included
    fn integer(self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    fn flag(self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    /// Container entries that are mappings
    fn containers(self) -> impl Iterator<Item = Node<'a>> {
        self.get("containers")
            .and_then(Node::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Node::from)
            .filter(|c| c.as_map().is_some())
    }
}

/// Extract every scheduling field of a document
///
/// Returns `None` when the object carries no scheduling information at all.
pub fn extract_scheduling_snapshot(doc: &Document) -> Option<SchedulingSnapshot> {
    let root = SpecRoot::of(doc);
    let (resource_requests, resource_limits) = merged_container_resources(root);

    let snapshot = SchedulingSnapshot {
        node_selector: root.string_map("nodeSelector"),
        node_name: root.string("nodeName"),
        affinity: root.map("affinity"),
        tolerations: root.sequence("tolerations"),
        topology_spread_constraints: root.sequence("topologySpreadConstraints"),
        resource_requests,
        resource_limits,
        scheduler_name: root.string("schedulerName"),
        priority_class_name: root.string("priorityClassName"),
        priority: root.integer("priority"),
        preemption_policy: root.string("preemptionPolicy"),
        runtime_class_name: root.string("runtimeClassName"),
        host_network: root.flag("hostNetwork").unwrap_or(false),
        host_pid: root.flag("hostPID").unwrap_or(false),
        host_ipc: root.flag("hostIPC").unwrap_or(false),
    };

    (!snapshot.is_empty()).then_some(snapshot)
}

/// Merge requests and limits of all containers by resource name
///
/// Values for a resource declared by several containers are joined with a
/// comma (`"1"` and `"2"` become `"1,2"`), not summed. When either value is
/// not a string, the first one is kept.
fn merged_container_resources(
    root: SpecRoot<'_>,
) -> (
    Option<BTreeMap<String, JsonValue>>,
    Option<BTreeMap<String, JsonValue>>,
) {
    let mut requests = BTreeMap::new();
    let mut limits = BTreeMap::new();

    for container in root.containers() {
        let Some(resources) = container.get("resources") else {
            continue;
        };
        if let Some(declared) = resources.get("requests").and_then(Node::as_map) {
            merge_quantities(&mut requests, declared);
        }
        if let Some(declared) = resources.get("limits").and_then(Node::as_map) {
            merge_quantities(&mut limits, declared);
        }
    }

    (
        (!requests.is_empty()).then_some(requests),
        (!limits.is_empty()).then_some(limits),
    )
}

fn merge_quantities(into: &mut BTreeMap<String, JsonValue>, declared: &Map<String, JsonValue>) {
    for (name, value) in declared {
        match into.get_mut(name) {
            Some(existing) => {
                if let (JsonValue::String(current), Some(next)) = (&*existing, value.as_str()) {
                    *existing = JsonValue::String(format!("{current},{next}"));
                }
            }
            None => {
                into.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Extract a single field group of a document
///
/// Returns `None` when the group is absent, including priority and runtime
/// bundles in which none of the member keys is set.
pub fn extract_field(doc: &Document, field: SchedulingField) -> Option<FieldView> {
    let root = SpecRoot::of(doc);

    match field {
        SchedulingField::Tolerations => root.sequence("tolerations").map(FieldView::Tolerations),
        SchedulingField::Affinity => root.map("affinity").map(FieldView::Affinity),
        SchedulingField::NodeSelector => {
            root.string_map("nodeSelector").map(FieldView::NodeSelector)
        }
        SchedulingField::Topology => root
            .sequence("topologySpreadConstraints")
            .map(FieldView::Topology),
        SchedulingField::Resources => {
            let containers = per_container_resources(root);
            (!containers.is_empty()).then_some(FieldView::Resources(containers))
        }
        SchedulingField::Priority => {
            let info = PriorityInfo {
                priority_class_name: root.string("priorityClassName"),
                priority: root.integer("priority"),
                preemption_policy: root.string("preemptionPolicy"),
            };
            (info != PriorityInfo::default()).then_some(FieldView::Priority(info))
        }
        SchedulingField::Runtime => {
            let info = RuntimeInfo {
                runtime_class_name: root.string("runtimeClassName"),
                host_network: root.flag("hostNetwork"),
                host_pid: root.flag("hostPID"),
                host_ipc: root.flag("hostIPC"),
            };
            (info != RuntimeInfo::default()).then_some(FieldView::Runtime(info))
        }
    }
}

/// Containers that declare non-empty requests or limits, in declaration order
fn per_container_resources(root: SpecRoot<'_>) -> Vec<ContainerResources> {
    root.containers()
        .filter_map(|container| {
            let resources = container.get("resources");
            let section = |key: &str| {
                resources?
                    .get(key)?
                    .as_map()
                    .filter(|m| !m.is_empty())
                    .cloned()
            };
            let requests = section("requests");
            let limits = section("limits");
            if requests.is_none() && limits.is_none() {
                return None;
            }
            Some(ContainerResources {
                name: container
                    .get("name")
                    .and_then(Node::as_str)
                    .unwrap_or_default()
                    .to_string(),
                requests,
                limits,
            })
        })
        .collect()
}
