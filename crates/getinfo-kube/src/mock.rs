//! In-memory discovery and object store for testing
//!
//! Lets queries run end to end without a Kubernetes cluster.

use async_trait::async_trait;
use getinfo_core::{Discovered, Document, ResourceCoordinate};
use kube::core::ErrorResponse;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::discovery::DiscoveryService;
use crate::error::{ClusterError, Result};
use crate::store::ObjectStore;

/// Discovery returning a fixed result
#[derive(Clone)]
pub struct MockDiscovery {
    discovered: Option<Discovered>,
}

impl MockDiscovery {
    /// Discovery that answers with `discovered`
    pub fn new(discovered: Discovered) -> Self {
        Self {
            discovered: Some(discovered),
        }
    }

    /// Discovery whose API server cannot be reached
    pub fn unavailable() -> Self {
        Self { discovered: None }
    }
}

#[async_trait]
impl DiscoveryService for MockDiscovery {
    async fn list_resource_catalog(&self) -> Result<Discovered> {
        self.discovered.clone().ok_or_else(|| {
            api_error(503, "ServiceUnavailable", "the server is currently unable to handle the request")
        })
    }
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub gets: usize,
    pub lists: usize,
    /// Names passed to `get`, in call order
    pub requested: Vec<String>,
    /// Namespaces passed to each call, in call order
    pub namespaces: Vec<Option<String>>,
}

/// In-memory object store keyed by (kind, namespace, name)
#[derive(Clone, Default)]
pub struct MockObjectStore {
    /// Storage: kind -> (namespace, name) -> document
    objects: Arc<RwLock<BTreeMap<String, BTreeMap<(String, String), Document>>>>,
    /// Names whose `get` fails with a server error
    failing: Arc<RwLock<HashSet<String>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

impl MockObjectStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated documents
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    /// Add a document, keyed by its kind, namespace and name
    pub fn insert(&self, doc: Document) {
        let kind = doc.kind().unwrap_or_default().to_string();
        let key = (
            doc.namespace().unwrap_or_default().to_string(),
            doc.name().to_string(),
        );
        self.objects
            .write()
            .unwrap()
            .entry(kind)
            .or_default()
            .insert(key, doc);
    }

    /// Make every `get` of `name` fail with an internal server error
    pub fn fail_on(&self, name: &str) {
        self.failing.write().unwrap().insert(name.to_string());
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        *self.operations.write().unwrap() = OperationCounts::default();
    }

    fn in_scope(coordinate: &ResourceCoordinate, namespace: Option<&str>, object_ns: &str) -> bool {
        !coordinate.namespaced || namespace.is_none_or(|ns| ns == object_ns)
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get(
        &self,
        coordinate: &ResourceCoordinate,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Document> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.gets += 1;
            ops.requested.push(name.to_string());
            ops.namespaces.push(namespace.map(str::to_string));
        }

        if self.failing.read().unwrap().contains(name) {
            return Err(api_error(500, "InternalError", "an error on the server"));
        }

        let objects = self.objects.read().unwrap();
        objects
            .get(&coordinate.kind)
            .and_then(|by_key| {
                by_key
                    .iter()
                    .find(|((ns, n), _)| n == name && Self::in_scope(coordinate, namespace, ns))
                    .map(|(_, doc)| doc.clone())
            })
            .ok_or_else(|| not_found(coordinate, name))
    }

    async fn list(
        &self,
        coordinate: &ResourceCoordinate,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<Document>> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.lists += 1;
            ops.namespaces.push(namespace.map(str::to_string));
        }

        let objects = self.objects.read().unwrap();
        Ok(objects
            .get(&coordinate.kind)
            .map(|by_key| {
                by_key
                    .iter()
                    .filter(|((ns, _), _)| Self::in_scope(coordinate, namespace, ns))
                    .filter(|(_, doc)| label_selector.is_none_or(|sel| matches_selector(doc, sel)))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Equality-based selector matching (`a=b,c==d,e!=f`); other terms match nothing
fn matches_selector(doc: &Document, selector: &str) -> bool {
    let labels = getinfo_core::labels(doc);
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((key, value)) = term.split_once("!=") {
                labels.get(key.trim()).map(String::as_str) != Some(value.trim())
            } else if let Some((key, value)) = term.split_once("==").or_else(|| term.split_once('=')) {
                labels.get(key.trim()).map(String::as_str) == Some(value.trim())
            } else {
                false
            }
        })
}

/// A Kubernetes 404 for `name` of the coordinate's type
pub fn not_found(coordinate: &ResourceCoordinate, name: &str) -> ClusterError {
    api_error(
        404,
        "NotFound",
        &format!("{} \"{}\" not found", coordinate.plural_name, name),
    )
}

fn api_error(code: u16, reason: &str, message: &str) -> ClusterError {
    ClusterError::Api(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pods() -> ResourceCoordinate {
        ResourceCoordinate {
            api_group: String::new(),
            api_version: "v1".to_string(),
            plural_name: "pods".to_string(),
            kind: "Pod".to_string(),
            namespaced: true,
        }
    }

    fn pod(namespace: &str, name: &str, app: &str) -> Document {
        Document::new(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": name, "namespace": namespace, "labels": {"app": app}}
        }))
    }

    fn store() -> MockObjectStore {
        MockObjectStore::with_documents([
            pod("default", "web-1", "web"),
            pod("default", "db-1", "db"),
            pod("prod", "web-2", "web"),
        ])
    }

    #[tokio::test]
    async fn test_get_respects_namespace() {
        let store = store();

        let doc = store.get(&pods(), Some("default"), "web-1").await.unwrap();
        assert_eq!(doc.name(), "web-1");

        let err = store.get(&pods(), Some("prod"), "web-1").await.unwrap_err();
        assert!(err.is_not_found());

        let counts = store.operation_counts();
        assert_eq!(counts.gets, 2);
        assert_eq!(counts.requested, vec!["web-1", "web-1"]);
    }

    #[tokio::test]
    async fn test_list_all_namespaces_with_selector() {
        let store = store();

        let all = store.list(&pods(), None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let web = store.list(&pods(), None, Some("app=web")).await.unwrap();
        let names: Vec<_> = web.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["web-1", "web-2"]);

        let not_web = store
            .list(&pods(), Some("default"), Some("app!=web"))
            .await
            .unwrap();
        assert_eq!(not_web.len(), 1);
        assert_eq!(not_web[0].name(), "db-1");

        assert_eq!(store.operation_counts().lists, 3);
    }

    #[tokio::test]
    async fn test_failing_name() {
        let store = store();
        store.fail_on("web-1");

        let err = store.get(&pods(), Some("default"), "web-1").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_unavailable_discovery() {
        let discovery = MockDiscovery::unavailable();
        assert!(discovery.list_resource_catalog().await.is_err());

        let discovery = MockDiscovery::new(Discovered::default());
        assert!(discovery.list_resource_catalog().await.is_ok());
    }

    #[test]
    fn test_reset_counts() {
        let store = MockObjectStore::new();
        store.operations.write().unwrap().gets = 4;
        store.reset_counts();
        assert_eq!(store.operation_counts().gets, 0);
    }
}
