//! Classified actions produced by the reconciliation engine

use crate::entry::{Entry, EntryKind, Role};
use serde::Serialize;
use std::fmt;

/// Disposition of a single entry after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    NoChange,
    Update,
    Create,
    Delete,
}

impl ActionKind {
    /// Phrase used in report lines
    pub fn verb(&self) -> &'static str {
        match self {
            Self::NoChange => "no changes for",
            Self::Update => "updating the permission for",
            Self::Create => "creating a permission for",
            Self::Delete => "deleting the permission for",
        }
    }

    /// Short label for summaries and batch headers
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "unchanged",
            Self::Update => "updates",
            Self::Create => "creates",
            Self::Delete => "deletes",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One step of a reconciliation plan, scoped to a single resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Observed entry already matches the declaration
    NoChange { resource_id: String, entry: Entry },
    /// Observed entry exists but its role differs
    Update {
        resource_id: String,
        id: String,
        principal: String,
        kind: EntryKind,
        new_role: Role,
    },
    /// Declared entry does not exist remotely
    Create {
        resource_id: String,
        principal: String,
        kind: EntryKind,
        role: Role,
    },
    /// Observed entry is not declared
    Delete {
        resource_id: String,
        id: String,
        principal: String,
        kind: EntryKind,
        role: Role,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::NoChange { .. } => ActionKind::NoChange,
            Self::Update { .. } => ActionKind::Update,
            Self::Create { .. } => ActionKind::Create,
            Self::Delete { .. } => ActionKind::Delete,
        }
    }

    /// Resource the action applies to
    pub fn resource_id(&self) -> &str {
        match self {
            Self::NoChange { resource_id, .. }
            | Self::Update { resource_id, .. }
            | Self::Create { resource_id, .. }
            | Self::Delete { resource_id, .. } => resource_id,
        }
    }

    /// Remote id of the entry, when it exists remotely
    pub fn entry_id(&self) -> Option<&str> {
        match self {
            Self::NoChange { entry, .. } => entry.id.as_deref(),
            Self::Update { id, .. } | Self::Delete { id, .. } => Some(id),
            Self::Create { .. } => None,
        }
    }

    pub fn principal(&self) -> &str {
        match self {
            Self::NoChange { entry, .. } => &entry.principal,
            Self::Update { principal, .. }
            | Self::Create { principal, .. }
            | Self::Delete { principal, .. } => principal,
        }
    }

    pub fn entry_kind(&self) -> EntryKind {
        match self {
            Self::NoChange { entry, .. } => entry.kind,
            Self::Update { kind, .. } | Self::Create { kind, .. } | Self::Delete { kind, .. } => {
                *kind
            }
        }
    }

    /// Role the action reports: the target role for updates and creates,
    /// the current role for no-ops and deletes
    pub fn role(&self) -> Role {
        match self {
            Self::NoChange { entry, .. } => entry.role,
            Self::Update { new_role, .. } => *new_role,
            Self::Create { role, .. } | Self::Delete { role, .. } => *role,
        }
    }
}

/// Renders `[resourceId] <verb> <role>:<kind>:<principal> (id=<id>)`
///
/// The id suffix is printed whenever the remote id is known, so only creates
/// go without it.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}:{}:{}",
            self.resource_id(),
            self.kind().verb(),
            self.role(),
            self.entry_kind(),
            self.principal()
        )?;
        match self.entry_id() {
            Some(id) => write!(f, " (id={id})"),
            None => Ok(()),
        }
    }
}
