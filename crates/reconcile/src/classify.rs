//! Change classification for a single resource
//!
//! Given what a resource currently has and what it should have, every
//! desired entry becomes exactly one of NoChange / Update / Create, and every
//! observed entry with no declared counterpart becomes a Delete.

use crate::action::Action;
use crate::entry::{Entry, identity_equals, needs_update};
use crate::types::{ResourceSpec, ResourceState};

/// Actions for one resource, bucketed by disposition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub no_changes: Vec<Action>,
    pub updates: Vec<Action>,
    pub creates: Vec<Action>,
    pub deletes: Vec<Action>,
}

impl Classification {
    /// Number of actions that would touch the remote store
    pub fn change_count(&self) -> usize {
        self.updates.len() + self.creates.len() + self.deletes.len()
    }
}

/// Classify one resource's observed entries against its desired entries
///
/// Both passes scan linearly and take the first identity match. Entry lists
/// are short, and first-match keeps the ordering guarantees obvious:
/// NoChange/Update/Create follow declared order, Delete follows fetched order.
pub fn classify(resource_id: &str, observed: &[Entry], desired: &[Entry]) -> Classification {
    let mut result = Classification::default();

    for d in desired {
        match observed.iter().find(|o| identity_equals(o, d)) {
            Some(o) => {
                // observed entries always carry an id; a missing one falls back to a create
                let Some(id) = o.id.clone() else {
                    result.creates.push(create_action(resource_id, d));
                    continue;
                };
                if needs_update(o, d) {
                    result.updates.push(Action::Update {
                        resource_id: resource_id.to_string(),
                        id,
                        principal: d.principal.clone(),
                        kind: o.kind,
                        new_role: d.role,
                    });
                } else {
                    result.no_changes.push(Action::NoChange {
                        resource_id: resource_id.to_string(),
                        entry: o.clone(),
                    });
                }
            }
            None => result.creates.push(create_action(resource_id, d)),
        }
    }

    for o in observed {
        if desired.iter().any(|d| identity_equals(d, o)) {
            continue;
        }
        let Some(id) = o.id.clone() else {
            continue;
        };
        result.deletes.push(Action::Delete {
            resource_id: resource_id.to_string(),
            id,
            principal: o.principal.clone(),
            kind: o.kind,
            role: o.role,
        });
    }

    result
}

/// Classify a validated spec against its validated snapshot
///
/// The resource id of `spec` scopes every action.
pub fn classify_resource(spec: &ResourceSpec, state: &ResourceState) -> Classification {
    classify(spec.resource_id(), state.observed(), spec.desired())
}

fn create_action(resource_id: &str, desired: &Entry) -> Action {
    Action::Create {
        resource_id: resource_id.to_string(),
        principal: desired.principal.clone(),
        kind: desired.kind,
        role: desired.role,
    }
}
