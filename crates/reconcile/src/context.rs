//! Provider traits for the reconciliation engine
//!
//! These traits allow the engine to be used without depending on a
//! specific remote API, declaration format, or terminal UI.

use crate::action::{Action, ActionKind};
use crate::entry::{Entry, EntryKind, Role};
use crate::types::DesiredState;
use anyhow::Result;

/// Remote capability for reading and changing the entries on a resource
///
/// Implementations are shared across worker threads while a batch runs, so
/// they must tolerate concurrent calls. Timeouts belong here too; the engine
/// waits for every call to finish.
pub trait AccessControlClient: Send + Sync {
    /// List the entries currently attached to a resource
    ///
    /// Every returned entry must carry its remote id.
    fn list(&self, resource_id: &str) -> Result<Vec<Entry>>;

    /// Attach a new entry, returning it as stored remotely
    fn create(&self, resource_id: &str, principal: &str, kind: EntryKind, role: Role)
    -> Result<Entry>;

    /// Change the role of an existing entry
    ///
    /// `transfer_ownership` is set when `role` is owner; the remote API
    /// rejects an ownership change without it.
    fn update(
        &self,
        resource_id: &str,
        id: &str,
        role: Role,
        transfer_ownership: bool,
    ) -> Result<Entry>;

    /// Remove an entry
    fn delete(&self, resource_id: &str, id: &str) -> Result<()>;
}

/// Supplier of the declared desired state
///
/// Implementations parse their own format and hand back an already
/// validated [`DesiredState`].
pub trait DesiredStateSource {
    fn load(&self) -> Result<DesiredState>;
}

/// Receiver for execution progress
///
/// `on_action` fires for every action before it is dispatched, including
/// no-ops. Completion callbacks fire after the whole batch has finished, in
/// plan order.
pub trait ReportSink {
    /// Called before a batch of one action kind is dispatched
    fn on_batch_start(&mut self, kind: ActionKind, count: usize);

    /// Called for each action before it runs
    fn on_action(&mut self, action: &Action);

    /// Called for each action once its batch has finished
    fn on_action_complete(&mut self, action: &Action, error: Option<&anyhow::Error>);

    /// Called when a batch completes
    fn on_batch_complete(&mut self, kind: ActionKind);
}

/// No-op report sink
pub struct NoReport;

impl ReportSink for NoReport {
    fn on_batch_start(&mut self, _kind: ActionKind, _count: usize) {}
    fn on_action(&mut self, _action: &Action) {}
    fn on_action_complete(&mut self, _action: &Action, _error: Option<&anyhow::Error>) {}
    fn on_batch_complete(&mut self, _kind: ActionKind) {}
}

/// Report sink that keeps every action line it sees
///
/// Useful for tests and for callers that print the log themselves.
#[derive(Debug, Default)]
pub struct CollectReport {
    pub lines: Vec<String>,
    pub failures: usize,
}

impl ReportSink for CollectReport {
    fn on_batch_start(&mut self, _kind: ActionKind, _count: usize) {}

    fn on_action(&mut self, action: &Action) {
        self.lines.push(action.to_string());
    }

    fn on_action_complete(&mut self, _action: &Action, error: Option<&anyhow::Error>) {
        if error.is_some() {
            self.failures += 1;
        }
    }

    fn on_batch_complete(&mut self, _kind: ActionKind) {}
}
