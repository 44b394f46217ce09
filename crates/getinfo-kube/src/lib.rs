//! getinfo Kube - Cluster access for kubectl-getinfo
//!
//! This crate provides:
//! - **Discovery**: The resource catalog of a live cluster, tolerating groups that fail
//! - **Object Store**: Retrieval of objects of any type as loosely-typed documents
//! - **Query**: Type resolution, namespace selection and retrieval in one call
//! - **Mocks**: In-memory discovery and store for tests without a cluster

pub mod client;
pub mod discovery;
pub mod error;
pub mod mock;
pub mod query;
pub mod store;

pub use client::ClusterClient;
pub use discovery::{DiscoveryService, KubeDiscovery};
pub use error::{ClusterError, Result};
pub use mock::{MockDiscovery, MockObjectStore, OperationCounts};
pub use query::{Query, QueryResult};
pub use store::{KubeObjectStore, ObjectStore};
