//! Execution engine - permsync executor with UI integration

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use reconcile::{
    AccessControlClient, Action, ActionKind, ExecuteSummary, ExecutionReport, ReconciliationPlan,
    ReportSink,
};

use super::differ::display_plan;
use crate::config::RunConfig;
use crate::progress;
use crate::ui;

/// Report sink that prints one line per action and a spinner per batch
pub struct TerminalReport {
    quiet: bool,
    pb: Option<ProgressBar>,
}

impl TerminalReport {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, pb: None }
    }

    fn print(&self, line: &str) {
        match &self.pb {
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }
}

impl ReportSink for TerminalReport {
    fn on_batch_start(&mut self, kind: ActionKind, count: usize) {
        let verb = match kind {
            ActionKind::Update => "Updating",
            ActionKind::Create => "Creating",
            ActionKind::Delete => "Deleting",
            ActionKind::NoChange => return,
        };
        log::info!("Applying {count} {kind}");
        self.pb = Some(progress::spinner(
            &format!("{verb} {}", ui::count(count, "permission")),
            self.quiet,
        ));
    }

    fn on_action(&mut self, action: &Action) {
        if self.quiet && action.kind() == ActionKind::NoChange {
            return;
        }
        self.print(&ui::action_line(action));
    }

    fn on_action_complete(&mut self, action: &Action, error: Option<&anyhow::Error>) {
        if let Some(err) = error {
            let line = format!("  {} {} ({:#})", "✗".red(), action, err);
            match &self.pb {
                Some(pb) => pb.suspend(|| eprintln!("{line}")),
                None => eprintln!("{line}"),
            }
        }
    }

    fn on_batch_complete(&mut self, kind: ActionKind) {
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
        log::debug!("{kind} batch complete");
    }
}

/// Show the plan, confirm, and apply it
///
/// Returns `None` when the user declines.
pub fn apply<C: AccessControlClient>(
    plan: &ReconciliationPlan,
    client: &C,
    config: &RunConfig,
) -> Result<Option<ExecutionReport>> {
    if !config.quiet {
        display_plan(plan);
    }

    if !plan.is_converged() && !config.dry_run && !config.yes && !confirm_proceed()? {
        println!();
        ui::warn("Aborted, no changes made");
        return Ok(None);
    }

    if !config.quiet {
        println!();
    }

    let mut sink = TerminalReport::new(config.quiet);
    let report = reconcile::execute(plan, client, &config.execute_options(), &mut sink)?;

    if !config.quiet {
        print_summary(&report.summary(), config.dry_run);
    }
    Ok(Some(report))
}

/// Confirm with user
///
/// Unattended runs (no terminal) proceed without asking.
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    if !console::user_attended() {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt("Apply these changes?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Print execution summary
fn print_summary(summary: &ExecuteSummary, dry_run: bool) {
    println!();
    if dry_run {
        println!("  {} Dry run - no changes made", "ℹ".blue());
    } else if summary.is_success() {
        println!("  {} Permissions applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Permissions applied with errors", "⚠".yellow().bold());
    }

    if summary.unchanged > 0 {
        println!("    • {} unchanged", ui::count(summary.unchanged, "permission"));
    }
    if summary.updated > 0 {
        println!("    • {} updated", ui::count(summary.updated, "permission"));
    }
    if summary.created > 0 {
        println!("    • {} created", ui::count(summary.created, "permission"));
    }
    if summary.deleted > 0 {
        println!("    • {} deleted", ui::count(summary.deleted, "permission"));
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", ui::count(summary.skipped, "permission"));
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}
