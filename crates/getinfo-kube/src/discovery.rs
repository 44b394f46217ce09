//! Resource discovery for Kubernetes clusters
//!
//! Lists every API group and version the cluster serves and turns their
//! resource lists into catalog entries. Aggregated APIs (metrics servers,
//! webhooks) often fail to answer; such group-versions are recorded as
//! failures and the rest of the catalog stays usable.

use async_trait::async_trait;
use getinfo_core::{
    CatalogEntry, Discovered, DiscoveredGroup, DiscoveredVersion, DiscoveryFailure,
    parse_group_version,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::Client;
use tracing::debug;

use crate::error::Result;

/// Source of the cluster's resource catalog
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// List every advertised resource type
    ///
    /// Fails only when nothing could be listed at all. Group-versions that
    /// fail individually are reported in [`Discovered::failures`].
    async fn list_resource_catalog(&self) -> Result<Discovered>;
}

/// Discovery backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeDiscovery {
    client: Client,
}

impl KubeDiscovery {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn core_group(&self, failures: &mut Vec<DiscoveryFailure>) -> Result<DiscoveredGroup> {
        let core = self.client.list_core_api_versions().await?;
        let mut group = DiscoveredGroup {
            name: String::new(),
            preferred_version: core.versions.first().cloned(),
            versions: Vec::with_capacity(core.versions.len()),
        };

        for version in core.versions {
            match self.client.list_core_api_resources(&version).await {
                Ok(list) => group.versions.push(DiscoveredVersion {
                    version,
                    entries: entries_from_list(&list),
                }),
                Err(e) => failures.push(DiscoveryFailure {
                    group_version: version,
                    message: e.to_string(),
                }),
            }
        }

        Ok(group)
    }
}

#[async_trait]
impl DiscoveryService for KubeDiscovery {
    async fn list_resource_catalog(&self) -> Result<Discovered> {
        let mut failures = Vec::new();
        let mut groups = vec![self.core_group(&mut failures).await?];

        let api_groups = self.client.list_api_groups().await?;
        debug!(count = api_groups.groups.len(), "discovered API groups");

        for api_group in api_groups.groups {
            let mut group = DiscoveredGroup {
                name: api_group.name,
                preferred_version: api_group.preferred_version.map(|v| v.version),
                versions: Vec::with_capacity(api_group.versions.len()),
            };

            for gv in api_group.versions {
                match self.client.list_api_group_resources(&gv.group_version).await {
                    Ok(list) => group.versions.push(DiscoveredVersion {
                        version: gv.version,
                        entries: entries_from_list(&list),
                    }),
                    Err(e) => {
                        debug!(group_version = %gv.group_version, error = %e, "group discovery failed");
                        failures.push(DiscoveryFailure {
                            group_version: gv.group_version,
                            message: e.to_string(),
                        });
                    }
                }
            }

            groups.push(group);
        }

        if !failures.is_empty() {
            debug!(failed = failures.len(), "API discovery was partial");
        }

        Ok(Discovered { groups, failures })
    }
}

/// Convert one `APIResourceList` into catalog entries
///
/// Sub-resources are kept here; resolution skips them.
pub fn entries_from_list(list: &APIResourceList) -> Vec<CatalogEntry> {
    let Some((group, version)) = parse_group_version(&list.group_version) else {
        debug!(group_version = %list.group_version, "skipping unparsable group version");
        return Vec::new();
    };

    list.resources
        .iter()
        .map(|resource| CatalogEntry {
            api_group: group.clone(),
            api_version: version.clone(),
            plural_name: resource.name.clone(),
            kind: resource.kind.clone(),
            short_aliases: resource.short_names.clone().unwrap_or_default(),
            namespaced: resource.namespaced,
        })
        .collect()
}
