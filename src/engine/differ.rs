//! Plan display - permsync-specific UI

use anyhow::Result;
use colored::Colorize;
use reconcile::{Action, ActionKind, ReconciliationPlan};

use crate::ui;

/// Display the pending changes grouped by file
pub fn display_plan(plan: &ReconciliationPlan) {
    if plan.is_converged() {
        println!();
        println!(
            "  {} No changes needed ({} up to date)",
            "✓".green(),
            ui::count(plan.no_changes().len(), "permission")
        );
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Permission Changes".bold()
    );
    println!("│");

    for (resource_id, changes) in group_by_resource(plan) {
        println!("│ {}", resource_id.bold());
        for action in changes {
            println!(
                "│   {} {:<40} {}",
                colored_symbol(action.kind()),
                describe_target(action),
                describe_change(action).dimmed()
            );
        }
        println!("│");
    }

    let summary = plan.summary();
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} update, {} create, {} delete, {} unchanged)",
        summary.total_changes().to_string().bold(),
        summary.updates.to_string().yellow(),
        summary.creates.to_string().green(),
        summary.deletes.to_string().red(),
        summary.unchanged.to_string().dimmed()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Serialize the plan for `plan --json`
pub fn plan_json(plan: &ReconciliationPlan) -> Result<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Changes grouped by resource, resources in first-seen order
///
/// Within a resource the order is updates, creates, deletes, matching the
/// order in which they are applied.
fn group_by_resource(plan: &ReconciliationPlan) -> Vec<(&str, Vec<&Action>)> {
    let mut groups: Vec<(&str, Vec<&Action>)> = Vec::new();
    let changes = plan
        .updates()
        .iter()
        .chain(plan.creates())
        .chain(plan.deletes());

    for action in changes {
        let resource_id = action.resource_id();
        match groups.iter_mut().find(|(id, _)| *id == resource_id) {
            Some((_, actions)) => actions.push(action),
            None => groups.push((resource_id, vec![action])),
        }
    }
    groups
}

fn colored_symbol(kind: ActionKind) -> colored::ColoredString {
    let symbol = ui::symbol(kind);
    match kind {
        ActionKind::NoChange => symbol.dimmed(),
        ActionKind::Update => symbol.yellow(),
        ActionKind::Create => symbol.green(),
        ActionKind::Delete => symbol.red(),
    }
}

fn describe_target(action: &Action) -> String {
    let principal = action.principal();
    if principal.is_empty() {
        action.entry_kind().to_string()
    } else {
        format!("{} ({})", principal, action.entry_kind())
    }
}

fn describe_change(action: &Action) -> String {
    match action {
        Action::Update { new_role, .. } => format!("→ {new_role}"),
        Action::Create { role, .. } => format!("(new) {role}"),
        Action::Delete { role, .. } => format!("(will remove) {role}"),
        Action::NoChange { entry, .. } => entry.role.to_string(),
    }
}
