//! Connection to the current kubeconfig context

use kube::{Client, Config};
use tracing::debug;

use crate::discovery::KubeDiscovery;
use crate::error::Result;
use crate::query::{Query, QueryResult};
use crate::store::KubeObjectStore;

/// Live cluster connection bundling discovery and object retrieval
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
}

impl ClusterClient {
    /// Connect using the ambient configuration (kubeconfig or in-cluster)
    pub async fn connect() -> Result<Self> {
        let config = Config::infer().await?;
        let client = Client::try_from(config)?;
        debug!(namespace = client.default_namespace(), "connected to cluster");
        Ok(Self { client })
    }

    /// Namespace of the current kubeconfig context
    pub fn default_namespace(&self) -> &str {
        self.client.default_namespace()
    }

    pub fn discovery(&self) -> KubeDiscovery {
        KubeDiscovery::new(self.client.clone())
    }

    pub fn store(&self) -> KubeObjectStore {
        KubeObjectStore::new(self.client.clone())
    }

    /// Run a query against this cluster
    pub async fn run(&self, query: &Query) -> Result<QueryResult> {
        query
            .run(&self.discovery(), &self.store(), self.default_namespace())
            .await
    }
}
