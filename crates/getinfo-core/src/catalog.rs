//! Resource catalog and type resolution
//!
//! The catalog is the flattened list of resource types a cluster advertises
//! through discovery. Resolution is first-match over that list, so the order
//! of the list decides which entry wins when two API groups serve the same
//! name. [`Catalog::from_groups`] fixes that order:
//!
//! 1. The core group (empty name) first, then the other groups by name
//! 2. Within a group, the preferred version first, then the rest as advertised
//! 3. Within a version, resources as advertised
//!
//! [`resolve`] itself honors whatever order it is given.

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// One resource type advertised by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// API group (empty string for the core group)
    pub api_group: String,
    pub api_version: String,
    /// Plural resource name, e.g. `deployments` or `pods/log` for sub-resources
    pub plural_name: String,
    pub kind: String,
    #[serde(default)]
    pub short_aliases: Vec<String>,
    pub namespaced: bool,
}

impl CatalogEntry {
    /// Sub-resources such as `pods/log` can never be a resolution target
    pub fn is_subresource(&self) -> bool {
        self.plural_name.contains('/')
    }

    /// Case-insensitive match on plural name, then kind, then short aliases
    pub fn matches(&self, input: &str) -> bool {
        self.plural_name.eq_ignore_ascii_case(input)
            || self.kind.eq_ignore_ascii_case(input)
            || self
                .short_aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(input))
    }

    pub fn coordinate(&self) -> ResourceCoordinate {
        ResourceCoordinate {
            api_group: self.api_group.clone(),
            api_version: self.api_version.clone(),
            plural_name: self.plural_name.clone(),
            kind: self.kind.clone(),
            namespaced: self.namespaced,
        }
    }
}

/// Fully-qualified address of a resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCoordinate {
    pub api_group: String,
    pub api_version: String,
    pub plural_name: String,
    /// Kind of the matched entry, used to address dynamic objects
    pub kind: String,
    pub namespaced: bool,
}

impl ResourceCoordinate {
    /// The `apiVersion` string objects of this type carry (`v1`, `apps/v1`)
    pub fn group_version(&self) -> String {
        if self.api_group.is_empty() {
            self.api_version.clone()
        } else {
            format!("{}/{}", self.api_group, self.api_version)
        }
    }
}

impl std::fmt::Display for ResourceCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.api_group.is_empty() {
            write!(f, "{}/{}", self.api_version, self.plural_name)
        } else {
            write!(
                f,
                "{}/{}/{}",
                self.api_group, self.api_version, self.plural_name
            )
        }
    }
}

/// Resolve a type string against catalog entries, in the order given
///
/// The first entry whose plural name, kind or one of its short aliases equals
/// `input` (ignoring ASCII case) wins. Sub-resources are skipped.
pub fn resolve(input: &str, entries: &[CatalogEntry]) -> Result<ResourceCoordinate, ResolveError> {
    entries
        .iter()
        .filter(|entry| !entry.is_subresource())
        .find(|entry| entry.matches(input))
        .map(CatalogEntry::coordinate)
        .ok_or_else(|| ResolveError::NotFound {
            resource_type: input.to_string(),
        })
}

/// Split an `apiVersion` string into `(group, version)`
///
/// `v1` is the core group; `apps/v1` is group `apps`. Anything with more
/// than one separator or an empty version is rejected.
pub fn parse_group_version(group_version: &str) -> Option<(String, String)> {
    match group_version.split_once('/') {
        None if !group_version.is_empty() => Some((String::new(), group_version.to_string())),
        None => None,
        Some((group, version)) => {
            if group.is_empty() || version.is_empty() || version.contains('/') {
                None
            } else {
                Some((group.to_string(), version.to_string()))
            }
        }
    }
}

/// Resources served by one version of a group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredVersion {
    pub version: String,
    pub entries: Vec<CatalogEntry>,
}

/// One API group as returned by discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredGroup {
    /// Group name (empty string for the core group)
    pub name: String,
    pub preferred_version: Option<String>,
    pub versions: Vec<DiscoveredVersion>,
}

/// A group-version whose resource listing failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    pub group_version: String,
    pub message: String,
}

/// Raw outcome of a discovery call, possibly partial
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
    pub groups: Vec<DiscoveredGroup>,
    pub failures: Vec<DiscoveryFailure>,
}

impl Discovered {
    /// Whether some group-versions failed while others were listed
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Turn the discovery outcome into a usable catalog
    ///
    /// Failures are tolerated as long as at least one entry survived. When
    /// everything failed, the catalog is unavailable. A clean discovery that
    /// found nothing is a valid, empty catalog.
    pub fn into_catalog(self) -> Result<Catalog, ResolveError> {
        let catalog = Catalog::from_groups(self.groups);

        if !self.failures.is_empty() && catalog.is_empty() {
            let message = self
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.group_version, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ResolveError::CatalogUnavailable { message });
        }

        Ok(catalog)
    }
}

/// Ordered catalog snapshot used for resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Use entries exactly in the given order
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Flatten discovered groups into the documented catalog order
    pub fn from_groups(mut groups: Vec<DiscoveredGroup>) -> Self {
        // Stable sort: the empty core group name sorts first
        groups.sort_by(|a, b| a.name.cmp(&b.name));

        let mut entries = Vec::new();
        for mut group in groups {
            if let Some(preferred) = &group.preferred_version
                && let Some(pos) = group.versions.iter().position(|v| &v.version == preferred)
            {
                let version = group.versions.remove(pos);
                group.versions.insert(0, version);
            }
            for version in group.versions {
                entries.extend(version.entries);
            }
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a type string against this catalog
    pub fn resolve(&self, input: &str) -> Result<ResourceCoordinate, ResolveError> {
        resolve(input, &self.entries)
    }
}
