//! Plan building - observe every declared file, then classify

use anyhow::Result;
use reconcile::{AccessControlClient, DesiredState, ReconciliationPlan};

use crate::progress;
use crate::ui;

/// Fetch the current permissions of every declared file and build the plan
///
/// Listing is all-or-nothing: a single failed list aborts before anything
/// is classified.
pub fn build_plan<C: AccessControlClient>(
    desired: &DesiredState,
    client: &C,
    jobs: usize,
    quiet: bool,
) -> Result<ReconciliationPlan> {
    let pb = progress::spinner(
        &format!(
            "Fetching permissions of {}",
            ui::count(desired.resources().len(), "file")
        ),
        quiet,
    );
    let observed = reconcile::observe(desired, client, jobs);
    pb.finish_and_clear();

    let plan = reconcile::plan::build(desired, &observed?)?;
    log::info!(
        "Plan: {} unchanged, {} updates, {} creates, {} deletes",
        plan.no_changes().len(),
        plan.updates().len(),
        plan.creates().len(),
        plan.deletes().len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{Entry, EntryKind, MemoryClient, ResourceSpec, Role};

    fn desired() -> DesiredState {
        DesiredState::new(
            1,
            vec![
                ResourceSpec::new(
                    "f1",
                    vec![Entry::desired("bob@x.com", EntryKind::User, Role::Writer)],
                )
                .unwrap(),
                ResourceSpec::new(
                    "f2",
                    vec![Entry::desired("x.com", EntryKind::Domain, Role::Reader)],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build_plan_from_client() {
        let client = MemoryClient::new();
        client.insert(
            "f1",
            vec![
                Entry::observed("p1", "bob@x.com", EntryKind::User, Role::Reader),
                Entry::observed("p2", "eve@x.com", EntryKind::User, Role::Writer),
            ],
        );
        client.insert("f2", vec![]);

        let plan = build_plan(&desired(), &client, 2, true).unwrap();
        assert_eq!(plan.updates().len(), 1);
        assert_eq!(plan.creates().len(), 1);
        assert_eq!(plan.deletes().len(), 1);
        assert_eq!(plan.creates()[0].resource_id(), "f2");
        assert_eq!(client.mutation_count(), 0);
    }

    #[test]
    fn test_list_failure_aborts() {
        let client = MemoryClient::new();
        client.insert("f1", vec![]);

        let err = build_plan(&desired(), &client, 2, true).unwrap_err();
        assert!(format!("{err:#}").contains("f2"));
    }
}
