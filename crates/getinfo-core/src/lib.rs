//! getinfo Core - Resource resolution and field extraction for kubectl-getinfo
//!
//! This crate provides the pure, I/O-free layer of the tool:
//! - `Document`: A retrieved object as a loosely-typed JSON tree with safe accessors
//! - `Catalog`: Discovered resource types and first-match type resolution
//! - `SchedulingSnapshot`: Scheduling fields extracted from pods and pod templates
//! - `OutputItem`: Per-object output records for every command

pub mod catalog;
pub mod document;
pub mod error;
pub mod metadata;
pub mod output;
pub mod scheduling;

pub use catalog::{
    Catalog, CatalogEntry, Discovered, DiscoveredGroup, DiscoveredVersion, DiscoveryFailure,
    ResourceCoordinate, parse_group_version, resolve,
};
pub use document::{Document, Node};
pub use error::{CoreError, ResolveError, Result};
pub use metadata::{OwnerReference, annotations, labels, owner_references};
pub use output::{Command, Output, OutputItem, build_item};
pub use scheduling::{
    ContainerResources, FieldLocation, FieldView, PriorityInfo, RuntimeInfo, SchedulingField,
    SchedulingSnapshot, extract_field, extract_scheduling_snapshot, locate_spec_root,
};
