//! Resolve, scope and fetch in one call

use getinfo_core::{Document, ResolveError, ResourceCoordinate};
use tracing::{debug, warn};

use crate::discovery::DiscoveryService;
use crate::error::{ClusterError, Result};
use crate::store::ObjectStore;

/// What the user asked to retrieve
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Plural, kind or short alias of the resource type
    pub resource_type: String,
    /// Names to fetch; empty means list
    pub names: Vec<String>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
    /// Label selector, only used when listing
    pub selector: Option<String>,
}

/// Objects retrieved for a query
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub coordinate: ResourceCoordinate,
    pub documents: Vec<Document>,
}

impl Query {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    /// Namespace to address for a resolved type
    ///
    /// `None` means every namespace for namespaced types.
    pub fn effective_namespace(
        &self,
        coordinate: &ResourceCoordinate,
        default_namespace: &str,
    ) -> Option<String> {
        if !coordinate.namespaced || self.all_namespaces {
            return None;
        }
        match &self.namespace {
            Some(ns) => Some(ns.clone()),
            None if default_namespace.is_empty() => Some("default".to_string()),
            None => Some(default_namespace.to_string()),
        }
    }

    /// Run the query against the given collaborators
    pub async fn run(
        &self,
        discovery: &dyn DiscoveryService,
        store: &dyn ObjectStore,
        default_namespace: &str,
    ) -> Result<QueryResult> {
        let discovered = discovery.list_resource_catalog().await.map_err(|e| {
            ClusterError::from(ResolveError::CatalogUnavailable {
                message: e.to_string(),
            })
        })?;

        if discovered.is_partial() {
            for failure in &discovered.failures {
                warn!(group_version = %failure.group_version, "unable to list resources: {}", failure.message);
            }
        }

        let catalog = discovered.into_catalog()?;
        let coordinate = catalog.resolve(&self.resource_type)?;
        let namespace = self.effective_namespace(&coordinate, default_namespace);
        debug!(resource = %coordinate, ?namespace, "resolved query");

        let documents = if self.names.is_empty() {
            store
                .list(&coordinate, namespace.as_deref(), self.selector.as_deref())
                .await
                .map_err(|e| ClusterError::List {
                    source: Box::new(e),
                })?
        } else {
            let mut documents = Vec::with_capacity(self.names.len());
            for name in &self.names {
                let doc = store
                    .get(&coordinate, namespace.as_deref(), name)
                    .await
                    .map_err(|e| ClusterError::Get {
                        name: name.clone(),
                        source: Box::new(e),
                    })?;
                documents.push(doc);
            }
            documents
        };

        Ok(QueryResult {
            coordinate,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDiscovery, MockObjectStore};
    use getinfo_core::{CatalogEntry, Discovered, DiscoveredGroup, DiscoveredVersion, DiscoveryFailure};
    use serde_json::json;

    fn entry(group: &str, plural: &str, kind: &str, short: &[&str], namespaced: bool) -> CatalogEntry {
        CatalogEntry {
            api_group: group.to_string(),
            api_version: "v1".to_string(),
            plural_name: plural.to_string(),
            kind: kind.to_string(),
            short_aliases: short.iter().map(|s| s.to_string()).collect(),
            namespaced,
        }
    }

    fn group(name: &str, entries: Vec<CatalogEntry>) -> DiscoveredGroup {
        DiscoveredGroup {
            name: name.to_string(),
            preferred_version: Some("v1".to_string()),
            versions: vec![DiscoveredVersion {
                version: "v1".to_string(),
                entries,
            }],
        }
    }

    fn discovery() -> MockDiscovery {
        MockDiscovery::new(Discovered {
            groups: vec![
                group(
                    "",
                    vec![
                        entry("", "pods", "Pod", &["po"], true),
                        entry("", "nodes", "Node", &["no"], false),
                    ],
                ),
                group("apps", vec![entry("apps", "deployments", "Deployment", &["deploy"], true)]),
            ],
            failures: vec![],
        })
    }

    fn object(kind: &str, namespace: Option<&str>, name: &str) -> Document {
        let mut metadata = json!({"name": name, "labels": {"app": name}});
        if let Some(ns) = namespace {
            metadata["namespace"] = json!(ns);
        }
        Document::new(json!({"apiVersion": "v1", "kind": kind, "metadata": metadata}))
    }

    fn store() -> MockObjectStore {
        MockObjectStore::with_documents([
            object("Pod", Some("default"), "a"),
            object("Pod", Some("default"), "b"),
            object("Pod", Some("team"), "c"),
            object("Node", None, "node-1"),
            object("Deployment", Some("team"), "web"),
        ])
    }

    #[tokio::test]
    async fn test_get_names_in_order() {
        let store = store();
        let query = Query {
            names: vec!["b".to_string(), "a".to_string()],
            ..Query::new("po")
        };

        let result = query.run(&discovery(), &store, "default").await.unwrap();
        let names: Vec<_> = result.documents.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(result.coordinate.to_string(), "v1/pods");

        let counts = store.operation_counts();
        assert_eq!(counts.gets, 2);
        assert_eq!(counts.lists, 0);
    }

    #[tokio::test]
    async fn test_get_stops_at_first_failure() {
        let store = store();
        let query = Query {
            names: vec!["a".to_string(), "missing".to_string(), "b".to_string()],
            ..Query::new("pods")
        };

        let err = query.run(&discovery(), &store, "default").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("error getting missing: "));
        assert_eq!(store.operation_counts().requested, vec!["a", "missing"]);
    }

    #[tokio::test]
    async fn test_list_issues_single_call() {
        let store = store();
        let query = Query {
            selector: Some("app=b".to_string()),
            ..Query::new("Pod")
        };

        let result = query.run(&discovery(), &store, "default").await.unwrap();
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].name(), "b");

        let counts = store.operation_counts();
        assert_eq!(counts.lists, 1);
        assert_eq!(counts.gets, 0);
    }

    #[tokio::test]
    async fn test_namespace_defaulting() {
        let store = store();

        Query::new("pods").run(&discovery(), &store, "team").await.unwrap();

        let explicit = Query {
            namespace: Some("default".to_string()),
            ..Query::new("pods")
        };
        explicit.run(&discovery(), &store, "team").await.unwrap();

        let all = Query {
            namespace: Some("default".to_string()),
            all_namespaces: true,
            ..Query::new("pods")
        };
        let result = all.run(&discovery(), &store, "team").await.unwrap();
        assert_eq!(result.documents.len(), 3);

        Query::new("nodes").run(&discovery(), &store, "team").await.unwrap();

        assert_eq!(
            store.operation_counts().namespaces,
            vec![
                Some("team".to_string()),
                Some("default".to_string()),
                None,
                None
            ]
        );
    }

    #[test]
    fn test_effective_namespace_falls_back_to_default() {
        let coordinate = entry("", "pods", "Pod", &[], true).coordinate();
        assert_eq!(
            Query::new("pods").effective_namespace(&coordinate, ""),
            Some("default".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let store = store();
        let err = Query::new("widgets")
            .run(&discovery(), &store, "default")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "resource type 'widgets' not found in cluster");
        assert_eq!(store.operation_counts().lists, 0);
    }

    #[tokio::test]
    async fn test_discovery_unavailable() {
        let err = Query::new("pods")
            .run(&MockDiscovery::unavailable(), &store(), "default")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClusterError::Resolve(ResolveError::CatalogUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_partial_discovery_still_resolves() {
        let discovery = MockDiscovery::new(Discovered {
            groups: vec![group("apps", vec![entry("apps", "deployments", "Deployment", &["deploy"], true)])],
            failures: vec![DiscoveryFailure {
                group_version: "metrics.k8s.io/v1beta1".to_string(),
                message: "service unavailable".to_string(),
            }],
        });

        let query = Query {
            namespace: Some("team".to_string()),
            ..Query::new("deploy")
        };
        let result = query.run(&discovery, &store(), "default").await.unwrap();
        assert_eq!(result.coordinate.to_string(), "apps/v1/deployments");
        assert_eq!(result.documents[0].name(), "web");
    }
}
