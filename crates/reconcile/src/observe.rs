//! Observation - fetch the current entries of every declared resource

use crate::context::AccessControlClient;
use crate::types::{DesiredState, ResourceState};
use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

/// List every declared resource concurrently
///
/// Snapshots come back in declaration order. Any failed listing, or a
/// listing that reports the same grant twice, fails the whole observation:
/// without a complete snapshot no plan can be built.
pub fn observe<C: AccessControlClient>(
    desired: &DesiredState,
    client: &C,
    jobs: usize,
) -> Result<Vec<ResourceState>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create observe thread pool")?;

    pool.install(|| {
        desired
            .resources()
            .par_iter()
            .map(|spec| -> Result<ResourceState> {
                let resource_id = spec.resource_id();
                let entries = client
                    .list(resource_id)
                    .with_context(|| format!("Failed to list permissions of {resource_id}"))?;
                debug!("{resource_id}: {} observed entries", entries.len());
                Ok(ResourceState::new(resource_id, entries)?)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryKind, Role};
    use crate::mock::MemoryClient;
    use crate::types::ResourceSpec;

    fn declaration(ids: &[&str]) -> DesiredState {
        let specs = ids
            .iter()
            .map(|id| {
                ResourceSpec::new(
                    *id,
                    vec![Entry::desired("bob@x.com", EntryKind::User, Role::Reader)],
                )
                .unwrap()
            })
            .collect();
        DesiredState::new(1, specs).unwrap()
    }

    #[test]
    fn test_observe_keeps_declaration_order() {
        let client = MemoryClient::new();
        for id in ["c", "a", "b"] {
            client.insert(id, vec![]);
        }

        let states = observe(&declaration(&["c", "a", "b"]), &client, 3).unwrap();
        let ids: Vec<_> = states.iter().map(ResourceState::resource_id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_observe_fails_on_missing_resource() {
        let client = MemoryClient::new();
        client.insert("a", vec![]);

        let err = observe(&declaration(&["a", "missing"]), &client, 2).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_observe_rejects_duplicate_remote_entries() {
        let client = MemoryClient::new();
        client.insert(
            "a",
            vec![
                Entry::observed("p1", "bob@x.com", EntryKind::User, Role::Reader),
                Entry::observed("p2", "bob@x.com", EntryKind::User, Role::Writer),
            ],
        );

        assert!(observe(&declaration(&["a"]), &client, 1).is_err());
    }
}
