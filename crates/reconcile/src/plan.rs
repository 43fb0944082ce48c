//! Reconciliation plan - classified actions across all resources

use crate::action::{Action, ActionKind};
use crate::classify::{Classification, classify_resource};
use crate::types::{DesiredState, ResourceState};
use anyhow::{Result, bail};
use serde::Serialize;

/// The immutable output of one reconciliation pass
///
/// Buckets keep resource iteration order, and within a resource the order
/// produced by classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    no_changes: Vec<Action>,
    updates: Vec<Action>,
    creates: Vec<Action>,
    deletes: Vec<Action>,
}

impl ReconciliationPlan {
    /// Concatenate per-resource classifications in iteration order
    pub fn aggregate<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Classification>,
    {
        let mut plan = Self::default();
        for result in results {
            plan.no_changes.extend(result.no_changes);
            plan.updates.extend(result.updates);
            plan.creates.extend(result.creates);
            plan.deletes.extend(result.deletes);
        }
        plan
    }

    pub fn no_changes(&self) -> &[Action] {
        &self.no_changes
    }

    pub fn updates(&self) -> &[Action] {
        &self.updates
    }

    pub fn creates(&self) -> &[Action] {
        &self.creates
    }

    pub fn deletes(&self) -> &[Action] {
        &self.deletes
    }

    /// Actions of one kind
    pub fn bucket(&self, kind: ActionKind) -> &[Action] {
        match kind {
            ActionKind::NoChange => &self.no_changes,
            ActionKind::Update => &self.updates,
            ActionKind::Create => &self.creates,
            ActionKind::Delete => &self.deletes,
        }
    }

    /// Number of actions that touch the remote store
    pub fn total_changes(&self) -> usize {
        self.updates.len() + self.creates.len() + self.deletes.len()
    }

    /// Whether observed state already matches the declaration
    pub fn is_converged(&self) -> bool {
        self.total_changes() == 0
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            unchanged: self.no_changes.len(),
            updates: self.updates.len(),
            creates: self.creates.len(),
            deletes: self.deletes.len(),
        }
    }

    /// Every action, grouped by bucket in report order
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.no_changes
            .iter()
            .chain(&self.updates)
            .chain(&self.creates)
            .chain(&self.deletes)
    }
}

/// Plan statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub unchanged: usize,
    pub updates: usize,
    pub creates: usize,
    pub deletes: usize,
}

impl PlanSummary {
    pub fn total_changes(&self) -> usize {
        self.updates + self.creates + self.deletes
    }
}

/// Build a plan from a declaration and the observed snapshots
///
/// Snapshots are paired with specs by resource id, and the plan follows the
/// declaration's resource order. Every declared resource needs a snapshot.
pub fn build(desired: &DesiredState, observed: &[ResourceState]) -> Result<ReconciliationPlan> {
    let mut results = Vec::with_capacity(desired.resources().len());

    for spec in desired.resources() {
        let Some(state) = observed
            .iter()
            .find(|s| s.resource_id() == spec.resource_id())
        else {
            bail!("No observed state for resource {}", spec.resource_id());
        };
        results.push(classify_resource(spec, state));
    }

    Ok(ReconciliationPlan::aggregate(results))
}
