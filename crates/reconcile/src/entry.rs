//! Access-control entries and the identity rules used to match them
//!
//! An [`Entry`] is one grant on a resource. Entries coming back from the
//! remote store carry an `id`; entries declared in the desired state do not.
//! Two entries refer to the same grant when their [`IdentityKey`]s are equal,
//! which ignores both `role` and `id`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of principal an entry grants access to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    User,
    Group,
    Domain,
    Anyone,
}

impl EntryKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Domain => "domain",
            Self::Anyone => "anyone",
        }
    }

    /// Whether entries of this kind name a principal
    ///
    /// `anyone` grants are the only ones without a principal.
    pub fn requires_principal(&self) -> bool {
        !matches!(self, Self::Anyone)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "domain" => Ok(Self::Domain),
            "anyone" => Ok(Self::Anyone),
            other => Err(format!("unknown entry type: {other}")),
        }
    }
}

/// Access level granted by an entry
///
/// `organizer` and `fileOrganizer` only exist on shared drives, where every
/// file inherits them from the drive's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Reader,
    Commenter,
    Writer,
    FileOrganizer,
    Organizer,
    Owner,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Commenter => "commenter",
            Self::Writer => "writer",
            Self::FileOrganizer => "fileOrganizer",
            Self::Organizer => "organizer",
            Self::Owner => "owner",
        }
    }

    /// Whether granting this role moves ownership of the resource
    ///
    /// The remote API refuses an owner update unless the caller asks for the
    /// transfer explicitly.
    pub fn transfers_ownership(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reader" => Ok(Self::Reader),
            "commenter" => Ok(Self::Commenter),
            "writer" => Ok(Self::Writer),
            "fileOrganizer" => Ok(Self::FileOrganizer),
            "organizer" => Ok(Self::Organizer),
            "owner" => Ok(Self::Owner),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One access grant, either observed (has an id) or desired (no id yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Remote identifier, present only for entries that exist remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Email address or domain; empty for `anyone`
    pub principal: String,
    pub kind: EntryKind,
    pub role: Role,
}

impl Entry {
    /// Create a desired-only entry
    pub fn desired(principal: impl Into<String>, kind: EntryKind, role: Role) -> Self {
        Self {
            id: None,
            principal: principal.into(),
            kind,
            role,
        }
    }

    /// Create an entry that exists remotely
    pub fn observed(
        id: impl Into<String>,
        principal: impl Into<String>,
        kind: EntryKind,
        role: Role,
    ) -> Self {
        Self {
            id: Some(id.into()),
            principal: principal.into(),
            kind,
            role,
        }
    }

    /// Whether the entry has been materialized remotely
    pub fn is_observed(&self) -> bool {
        self.id.is_some()
    }

    /// Identity of the grant, independent of role and id
    pub fn identity(&self) -> IdentityKey<'_> {
        IdentityKey {
            principal: &self.principal,
            kind: self.kind,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.role, self.kind, self.principal)
    }
}

/// Identity of an access grant: principal plus entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey<'a> {
    pub principal: &'a str,
    pub kind: EntryKind,
}

impl fmt::Display for IdentityKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.principal)
    }
}

/// Whether two entries refer to the same grant
pub fn identity_equals(a: &Entry, b: &Entry) -> bool {
    a.principal == b.principal && a.kind == b.kind
}

/// Whether an observed entry must be updated to match a desired one
///
/// Callers only ask this for entries that already match by identity. The
/// kind comparison is kept alongside role so the check stays symmetric with
/// the identity fields.
pub fn needs_update(observed: &Entry, desired: &Entry) -> bool {
    observed.role != desired.role || observed.kind != desired.kind
}
