//! Object retrieval for any resource type
//!
//! Objects are fetched through the dynamic API so that built-in types and
//! custom resources share one code path.

use async_trait::async_trait;
use getinfo_core::{Document, ResourceCoordinate};
use kube::{
    Client,
    api::{Api, ApiResource, DynamicObject, ListParams},
    core::TypeMeta,
};
use tracing::debug;

use crate::error::Result;

/// Retrieves objects addressed by a resolved coordinate
///
/// A `namespace` of `None` means "all namespaces" for namespaced types and
/// is ignored for cluster-scoped types.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a single object by name
    async fn get(
        &self,
        coordinate: &ResourceCoordinate,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Document>;

    /// List objects, optionally filtered by a label selector
    async fn list(
        &self,
        coordinate: &ResourceCoordinate,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<Document>>;
}

/// Object store backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
}

impl KubeObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, coordinate: &ResourceCoordinate, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = api_resource(coordinate);
        match namespace {
            Some(ns) if coordinate.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl ObjectStore for KubeObjectStore {
    async fn get(
        &self,
        coordinate: &ResourceCoordinate,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Document> {
        debug!(resource = %coordinate, ?namespace, name, "getting object");
        let object = self.api(coordinate, namespace).get(name).await?;
        into_document(object, coordinate)
    }

    async fn list(
        &self,
        coordinate: &ResourceCoordinate,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<Document>> {
        debug!(resource = %coordinate, ?namespace, ?label_selector, "listing objects");

        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }

        let list = self.api(coordinate, namespace).list(&params).await?;
        debug!(count = list.items.len(), "listed objects");

        list.items
            .into_iter()
            .map(|object| into_document(object, coordinate))
            .collect()
    }
}

/// Build the dynamic API descriptor for a coordinate
pub fn api_resource(coordinate: &ResourceCoordinate) -> ApiResource {
    ApiResource {
        group: coordinate.api_group.clone(),
        version: coordinate.api_version.clone(),
        api_version: coordinate.group_version(),
        kind: coordinate.kind.clone(),
        plural: coordinate.plural_name.clone(),
    }
}

/// Convert a dynamic object into a document
///
/// List responses leave `apiVersion`/`kind` off their items; those are
/// filled in from the coordinate.
fn into_document(mut object: DynamicObject, coordinate: &ResourceCoordinate) -> Result<Document> {
    object.types.get_or_insert_with(|| TypeMeta {
        api_version: coordinate.group_version(),
        kind: coordinate.kind.clone(),
    });
    Ok(Document::new(serde_json::to_value(object)?))
}
