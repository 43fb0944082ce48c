//! Core types for access-control reconciliation

use crate::entry::Entry;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The only declaration version understood by the engine
pub const SUPPORTED_VERSION: u32 = 1;

/// Desired entries for one governed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSpec {
    resource_id: String,
    desired: Vec<Entry>,
}

impl ResourceSpec {
    /// Validate and build a resource spec
    ///
    /// Rejects an empty resource id, principals that do not fit their kind,
    /// and entries that share an identity. An empty entry list is accepted
    /// here; [`DesiredState::new`] decides whether declarations may be empty.
    pub fn new(resource_id: impl Into<String>, desired: Vec<Entry>) -> Result<Self> {
        let resource_id = resource_id.into();
        if resource_id.is_empty() {
            return Err(ConfigError::EmptyResourceId);
        }

        for entry in &desired {
            if entry.kind.requires_principal() && entry.principal.is_empty() {
                return Err(ConfigError::MissingPrincipal {
                    resource_id,
                    kind: entry.kind.to_string(),
                });
            }
            if !entry.kind.requires_principal() && !entry.principal.is_empty() {
                return Err(ConfigError::UnexpectedPrincipal {
                    resource_id,
                    principal: entry.principal.clone(),
                });
            }
        }

        if let Some(identity) = first_duplicate(&desired) {
            return Err(ConfigError::DuplicateDesired {
                resource_id,
                identity,
            });
        }

        Ok(Self {
            resource_id,
            desired,
        })
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Desired entries in declared order
    pub fn desired(&self) -> &[Entry] {
        &self.desired
    }
}

/// Snapshot of the entries currently attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    resource_id: String,
    observed: Vec<Entry>,
}

impl ResourceState {
    /// Validate and build an observed snapshot
    ///
    /// Every entry must carry a remote id and identities must be unique;
    /// a store that reports the same grant twice is treated as inconsistent.
    pub fn new(resource_id: impl Into<String>, observed: Vec<Entry>) -> Result<Self> {
        let resource_id = resource_id.into();

        if let Some(entry) = observed.iter().find(|e| !e.is_observed()) {
            return Err(ConfigError::MissingId {
                resource_id,
                entry: entry.to_string(),
            });
        }

        if let Some(identity) = first_duplicate(&observed) {
            return Err(ConfigError::DuplicateObserved {
                resource_id,
                identity,
            });
        }

        Ok(Self {
            resource_id,
            observed,
        })
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Observed entries in fetched order
    pub fn observed(&self) -> &[Entry] {
        &self.observed
    }
}

/// The full declared state: a version tag and the governed resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredState {
    version: u32,
    resources: Vec<ResourceSpec>,
}

impl DesiredState {
    /// Validate a declaration
    ///
    /// The version must be [`SUPPORTED_VERSION`], at least one resource must
    /// be declared, every resource must list at least one entry, and no
    /// resource may be declared twice.
    pub fn new(version: u32, resources: Vec<ResourceSpec>) -> Result<Self> {
        if version != SUPPORTED_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }
        if resources.is_empty() {
            return Err(ConfigError::NoResources);
        }

        let mut seen = HashSet::new();
        for spec in &resources {
            if spec.desired.is_empty() {
                return Err(ConfigError::NoEntries {
                    resource_id: spec.resource_id.clone(),
                });
            }
            if !seen.insert(spec.resource_id.as_str()) {
                return Err(ConfigError::DuplicateResource(spec.resource_id.clone()));
            }
        }

        Ok(Self { version, resources })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Resources in declared order
    pub fn resources(&self) -> &[ResourceSpec] {
        &self.resources
    }

    /// Total number of declared entries across all resources
    pub fn entry_count(&self) -> usize {
        self.resources.iter().map(|r| r.desired.len()).sum()
    }
}

fn first_duplicate(entries: &[Entry]) -> Option<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(Entry::identity)
        .find(|key| !seen.insert(*key))
        .map(|key| key.to_string())
}

/// Options for plan execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Report every action without calling the client
    pub dry_run: bool,
    /// Number of concurrent remote calls per batch
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
        }
    }
}

/// Counts of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub unchanged: usize,
    pub updated: usize,
    pub created: usize,
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ExecuteSummary {
    /// Number of remote changes that succeeded
    pub fn total_changes(&self) -> usize {
        self.updated + self.created + self.deleted
    }

    /// Whether every attempted action succeeded
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of actions accounted for
    pub fn total(&self) -> usize {
        self.unchanged + self.updated + self.created + self.deleted + self.failed + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, Role};

    fn bob(role: Role) -> Entry {
        Entry::desired("bob@x.com", EntryKind::User, role)
    }

    #[test]
    fn test_resource_spec_rejects_duplicate_identity() {
        let err = ResourceSpec::new("f1", vec![bob(Role::Reader), bob(Role::Writer)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateDesired {
                resource_id: "f1".into(),
                identity: "user:bob@x.com".into(),
            }
        );
    }

    #[test]
    fn test_resource_spec_allows_same_principal_with_other_kind() {
        let spec = ResourceSpec::new(
            "f1",
            vec![
                Entry::desired("eng@x.com", EntryKind::User, Role::Reader),
                Entry::desired("eng@x.com", EntryKind::Group, Role::Reader),
            ],
        );
        assert!(spec.is_ok());
    }

    #[test]
    fn test_resource_spec_checks_principal_against_kind() {
        let missing = ResourceSpec::new("f1", vec![Entry::desired("", EntryKind::User, Role::Reader)]);
        assert!(matches!(missing, Err(ConfigError::MissingPrincipal { .. })));

        let unexpected = ResourceSpec::new(
            "f1",
            vec![Entry::desired("bob@x.com", EntryKind::Anyone, Role::Reader)],
        );
        assert!(matches!(
            unexpected,
            Err(ConfigError::UnexpectedPrincipal { .. })
        ));

        let anyone = ResourceSpec::new("f1", vec![Entry::desired("", EntryKind::Anyone, Role::Reader)]);
        assert!(anyone.is_ok());
    }

    #[test]
    fn test_resource_spec_rejects_empty_id() {
        assert_eq!(
            ResourceSpec::new("", vec![bob(Role::Reader)]).unwrap_err(),
            ConfigError::EmptyResourceId
        );
    }

    #[test]
    fn test_resource_state_rejects_duplicates_and_missing_ids() {
        let dup = ResourceState::new(
            "f1",
            vec![
                Entry::observed("p1", "bob@x.com", EntryKind::User, Role::Reader),
                Entry::observed("p2", "bob@x.com", EntryKind::User, Role::Writer),
            ],
        );
        assert!(matches!(dup, Err(ConfigError::DuplicateObserved { .. })));

        let no_id = ResourceState::new("f1", vec![bob(Role::Reader)]);
        assert!(matches!(no_id, Err(ConfigError::MissingId { .. })));
    }

    #[test]
    fn test_desired_state_version_and_emptiness() {
        let spec = ResourceSpec::new("f1", vec![bob(Role::Reader)]).unwrap();

        assert_eq!(
            DesiredState::new(2, vec![spec.clone()]).unwrap_err(),
            ConfigError::UnsupportedVersion(2)
        );
        assert_eq!(
            DesiredState::new(1, vec![]).unwrap_err(),
            ConfigError::NoResources
        );

        let empty = ResourceSpec::new("f2", vec![]).unwrap();
        assert_eq!(
            DesiredState::new(1, vec![spec.clone(), empty]).unwrap_err(),
            ConfigError::NoEntries {
                resource_id: "f2".into()
            }
        );

        assert_eq!(
            DesiredState::new(1, vec![spec.clone(), spec.clone()]).unwrap_err(),
            ConfigError::DuplicateResource("f1".into())
        );

        let state = DesiredState::new(1, vec![spec]).unwrap();
        assert_eq!(state.version(), 1);
        assert_eq!(state.entry_count(), 1);
    }

    #[test]
    fn test_summary_totals() {
        let summary = ExecuteSummary {
            unchanged: 2,
            updated: 1,
            created: 1,
            deleted: 1,
            failed: 1,
            skipped: 0,
        };
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.total(), 6);
        assert!(!summary.is_success());
    }
}
