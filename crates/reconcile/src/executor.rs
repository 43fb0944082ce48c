//! Plan executor - applies a reconciliation plan through an access-control client
//!
//! Updates, creates and deletes run as three batches. Actions inside a batch
//! are independent (every update/delete already knows its remote id) and run
//! concurrently on a bounded rayon pool. A failing action is recorded in the
//! report and never stops its siblings.

use crate::action::{Action, ActionKind};
use crate::context::{AccessControlClient, ReportSink};
use crate::entry::Entry;
use crate::plan::ReconciliationPlan;
use crate::report::{ExecutionReport, Outcome};
use crate::types::ExecuteOptions;
use anyhow::{Context, Result, bail};
use log::{debug, info};
use rayon::prelude::*;

/// Execute a plan with the given client and report sink
///
/// No-op actions are only reported. With `opts.dry_run` every action is
/// reported and recorded as skipped without touching the client.
///
/// # Returns
/// Per-action results. The only error is failing to build the worker pool.
pub fn execute<C, S>(
    plan: &ReconciliationPlan,
    client: &C,
    opts: &ExecuteOptions,
    sink: &mut S,
) -> Result<ExecutionReport>
where
    C: AccessControlClient,
    S: ReportSink,
{
    let mut report = ExecutionReport::default();

    if !plan.no_changes().is_empty() {
        sink.on_batch_start(ActionKind::NoChange, plan.no_changes().len());
        for action in plan.no_changes() {
            sink.on_action(action);
            if let Action::NoChange { entry, .. } = action {
                report.unchanged.push(entry.clone());
            }
        }
        sink.on_batch_complete(ActionKind::NoChange);
    }

    if opts.dry_run {
        for kind in [ActionKind::Update, ActionKind::Create, ActionKind::Delete] {
            let actions = plan.bucket(kind);
            if actions.is_empty() {
                continue;
            }
            sink.on_batch_start(kind, actions.len());
            for action in actions {
                sink.on_action(action);
            }
            sink.on_batch_complete(kind);
            report.skipped.extend(actions.iter().cloned());
        }
        return Ok(report);
    }

    if plan.is_converged() {
        return Ok(report);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs.max(1))
        .build()
        .context("Failed to create apply thread pool")?;

    report.updated = run_batch(&pool, plan.updates(), ActionKind::Update, sink, |action| {
        apply_update(client, action)
    });
    report.created = run_batch(&pool, plan.creates(), ActionKind::Create, sink, |action| {
        apply_create(client, action)
    });
    report.deleted = run_batch(&pool, plan.deletes(), ActionKind::Delete, sink, |action| {
        apply_delete(client, action)
    });

    Ok(report)
}

/// Run every action of one kind to completion
///
/// Results come back in input order; `par_iter().collect()` keeps indices
/// even though the calls finish in any order.
fn run_batch<T, F, S>(
    pool: &rayon::ThreadPool,
    actions: &[Action],
    kind: ActionKind,
    sink: &mut S,
    apply: F,
) -> Vec<Outcome<T>>
where
    T: Send,
    F: Fn(&Action) -> Result<T> + Sync,
    S: ReportSink,
{
    if actions.is_empty() {
        return Vec::new();
    }

    info!("Applying {} {}", actions.len(), kind);
    sink.on_batch_start(kind, actions.len());
    for action in actions {
        sink.on_action(action);
    }

    let results: Vec<Result<T>> = pool.install(|| actions.par_iter().map(&apply).collect());

    let outcomes: Vec<Outcome<T>> = actions
        .iter()
        .cloned()
        .zip(results)
        .map(|(action, result)| Outcome { action, result })
        .collect();

    for outcome in &outcomes {
        sink.on_action_complete(&outcome.action, outcome.error());
    }
    sink.on_batch_complete(kind);

    outcomes
}

fn apply_update<C: AccessControlClient>(client: &C, action: &Action) -> Result<Entry> {
    let Action::Update {
        resource_id,
        id,
        new_role,
        ..
    } = action
    else {
        bail!("Expected an update action, got {action}");
    };

    let transfer_ownership = new_role.transfers_ownership();
    debug!("update {resource_id}/{id} -> {new_role} (transfer_ownership={transfer_ownership})");
    client
        .update(resource_id, id, *new_role, transfer_ownership)
        .with_context(|| format!("Failed to update permission {id} on {resource_id}"))
}

fn apply_create<C: AccessControlClient>(client: &C, action: &Action) -> Result<Entry> {
    let Action::Create {
        resource_id,
        principal,
        kind,
        role,
    } = action
    else {
        bail!("Expected a create action, got {action}");
    };

    debug!("create {resource_id} {role}:{kind}:{principal}");
    client
        .create(resource_id, principal, *kind, *role)
        .with_context(|| format!("Failed to create permission for {principal} on {resource_id}"))
}

fn apply_delete<C: AccessControlClient>(client: &C, action: &Action) -> Result<()> {
    let Action::Delete {
        resource_id, id, ..
    } = action
    else {
        bail!("Expected a delete action, got {action}");
    };

    debug!("delete {resource_id}/{id}");
    client
        .delete(resource_id, id)
        .with_context(|| format!("Failed to delete permission {id} on {resource_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CollectReport, NoReport};
    use crate::entry::{Entry, EntryKind, Role};
    use crate::mock::{Call, MemoryClient};
    use crate::observe::observe;
    use crate::plan::build;
    use crate::types::{DesiredState, ResourceSpec};

    fn user(principal: &str, role: Role) -> Entry {
        Entry::desired(principal, EntryKind::User, role)
    }

    fn seen(id: &str, principal: &str, role: Role) -> Entry {
        Entry::observed(id, principal, EntryKind::User, role)
    }

    fn plan_for(client: &MemoryClient, desired: &DesiredState) -> ReconciliationPlan {
        let states = observe(desired, client, 2).unwrap();
        build(desired, &states).unwrap()
    }

    fn declaration() -> DesiredState {
        DesiredState::new(
            1,
            vec![
                ResourceSpec::new(
                    "f1",
                    vec![user("bob@x.com", Role::Writer), user("dan@x.com", Role::Reader)],
                )
                .unwrap(),
                ResourceSpec::new("f2", vec![user("erin@x.com", Role::Commenter)]).unwrap(),
            ],
        )
        .unwrap()
    }

    fn seeded_client() -> MemoryClient {
        let client = MemoryClient::new();
        client.insert(
            "f1",
            vec![
                seen("p1", "bob@x.com", Role::Reader),
                seen("p2", "carol@x.com", Role::Writer),
            ],
        );
        client.insert("f2", vec![seen("p3", "erin@x.com", Role::Commenter)]);
        client
    }

    #[test]
    fn test_execute_applies_every_change() {
        let client = seeded_client();
        let desired = declaration();
        let plan = plan_for(&client, &desired);

        let report = execute(&plan, &client, &ExecuteOptions::default(), &mut NoReport).unwrap();

        let summary = report.summary();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.unchanged, 1);
        assert!(report.is_success());

        let f1 = client.entries("f1");
        assert!(f1.iter().any(|e| e.principal == "bob@x.com" && e.role == Role::Writer));
        assert!(f1.iter().any(|e| e.principal == "dan@x.com"));
        assert!(!f1.iter().any(|e| e.principal == "carol@x.com"));
    }

    #[test]
    fn test_second_run_is_all_no_change() {
        let client = seeded_client();
        let desired = declaration();

        let first = plan_for(&client, &desired);
        execute(&first, &client, &ExecuteOptions::default(), &mut NoReport).unwrap();

        let second = plan_for(&client, &desired);
        assert!(second.is_converged());
        assert_eq!(second.no_changes().len(), desired.entry_count());
    }

    #[test]
    fn test_failure_does_not_abort_siblings() {
        let client = seeded_client();
        client.fail_for("dan@x.com");
        let desired = declaration();
        let plan = plan_for(&client, &desired);

        let mut sink = CollectReport::default();
        let report = execute(&plan, &client, &ExecuteOptions::default(), &mut sink).unwrap();

        assert!(!report.is_success());
        assert_eq!(sink.failures, 1);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.principal(), "dan@x.com");

        // the update and delete batches still ran
        let summary = report.summary();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_owner_update_sets_transfer_flag() {
        let client = MemoryClient::new();
        client.insert("f1", vec![seen("p1", "bob@x.com", Role::Writer)]);
        let desired = DesiredState::new(
            1,
            vec![ResourceSpec::new("f1", vec![user("bob@x.com", Role::Owner)]).unwrap()],
        )
        .unwrap();
        let plan = plan_for(&client, &desired);

        let report = execute(&plan, &client, &ExecuteOptions::default(), &mut NoReport).unwrap();

        assert!(report.is_success());
        assert!(client.calls().contains(&Call::Update {
            resource_id: "f1".into(),
            id: "p1".into(),
            role: Role::Owner,
            transfer_ownership: true,
        }));
    }

    #[test]
    fn test_dry_run_makes_no_calls() {
        let client = seeded_client();
        let desired = declaration();
        let plan = plan_for(&client, &desired);

        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let mut sink = CollectReport::default();
        let report = execute(&plan, &client, &opts, &mut sink).unwrap();

        assert_eq!(client.mutation_count(), 0);
        assert_eq!(report.skipped.len(), plan.total_changes());
        assert_eq!(sink.lines.len(), plan.iter().count());
    }

    #[test]
    fn test_report_lines_in_bucket_order() {
        let client = seeded_client();
        let desired = declaration();
        let plan = plan_for(&client, &desired);

        let mut sink = CollectReport::default();
        execute(&plan, &client, &ExecuteOptions::default(), &mut sink).unwrap();

        assert_eq!(
            sink.lines,
            vec![
                "[f2] no changes for commenter:user:erin@x.com (id=p3)",
                "[f1] updating the permission for writer:user:bob@x.com (id=p1)",
                "[f1] creating a permission for reader:user:dan@x.com",
                "[f1] deleting the permission for writer:user:carol@x.com (id=p2)",
            ]
        );
    }

    #[test]
    fn test_outcomes_follow_plan_order() {
        let client = MemoryClient::new();
        client.insert("f1", vec![]);
        let entries: Vec<Entry> = (0..16)
            .map(|i| user(&format!("u{i}@x.com"), Role::Reader))
            .collect();
        let desired =
            DesiredState::new(1, vec![ResourceSpec::new("f1", entries).unwrap()]).unwrap();
        let plan = plan_for(&client, &desired);

        let opts = ExecuteOptions {
            jobs: 8,
            ..Default::default()
        };
        let report = execute(&plan, &client, &opts, &mut NoReport).unwrap();

        let principals: Vec<_> = report.created.iter().map(|o| o.action.principal()).collect();
        let expected: Vec<_> = plan.creates().iter().map(Action::principal).collect();
        assert_eq!(principals, expected);
    }

    #[test]
    fn test_converged_plan_makes_no_calls() {
        let client = MemoryClient::new();
        client.insert("f1", vec![seen("p1", "bob@x.com", Role::Writer)]);
        let desired = DesiredState::new(
            1,
            vec![ResourceSpec::new("f1", vec![user("bob@x.com", Role::Writer)]).unwrap()],
        )
        .unwrap();
        let plan = plan_for(&client, &desired);

        let report = execute(&plan, &client, &ExecuteOptions::default(), &mut NoReport).unwrap();

        assert_eq!(report.unchanged.len(), 1);
        assert_eq!(client.mutation_count(), 0);
    }
}
