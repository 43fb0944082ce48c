//! Execution report - per-action results of applying a plan

use crate::action::Action;
use crate::entry::Entry;
use crate::types::ExecuteSummary;

/// Result of one remote action
#[derive(Debug)]
pub struct Outcome<T> {
    pub action: Action,
    pub result: anyhow::Result<T>,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The error, if the action failed
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.result.as_ref().err()
    }
}

/// Terminal report of a plan execution
///
/// Each list follows plan order regardless of the order in which the remote
/// calls completed.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub unchanged: Vec<Entry>,
    pub updated: Vec<Outcome<Entry>>,
    pub created: Vec<Outcome<Entry>>,
    pub deleted: Vec<Outcome<()>>,
    /// Actions reported but not sent (dry run)
    pub skipped: Vec<Action>,
}

impl ExecutionReport {
    /// Failed actions with their errors, in report order
    pub fn failures(&self) -> Vec<(&Action, &anyhow::Error)> {
        let updated = self.updated.iter().filter_map(failure);
        let created = self.created.iter().filter_map(failure);
        let deleted = self.deleted.iter().filter_map(failure);
        updated.chain(created).chain(deleted).collect()
    }

    /// Whether every attempted action succeeded
    pub fn is_success(&self) -> bool {
        self.updated.iter().all(Outcome::is_success)
            && self.created.iter().all(Outcome::is_success)
            && self.deleted.iter().all(Outcome::is_success)
    }

    pub fn summary(&self) -> ExecuteSummary {
        let ok = |n: usize, total: usize| (n, total - n);
        let (updated, failed_updates) = ok(
            self.updated.iter().filter(|o| o.is_success()).count(),
            self.updated.len(),
        );
        let (created, failed_creates) = ok(
            self.created.iter().filter(|o| o.is_success()).count(),
            self.created.len(),
        );
        let (deleted, failed_deletes) = ok(
            self.deleted.iter().filter(|o| o.is_success()).count(),
            self.deleted.len(),
        );

        ExecuteSummary {
            unchanged: self.unchanged.len(),
            updated,
            created,
            deleted,
            failed: failed_updates + failed_creates + failed_deletes,
            skipped: self.skipped.len(),
        }
    }
}

fn failure<T>(outcome: &Outcome<T>) -> Option<(&Action, &anyhow::Error)> {
    outcome.error().map(|e| (&outcome.action, e))
}
