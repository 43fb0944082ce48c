//! Configuration errors raised before any remote call is made

use thiserror::Error;

/// Problems with the declared or observed state that stop a run before
/// classification begins
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Declaration version other than the supported one
    #[error("v{0} is not supported")]
    UnsupportedVersion(u32),

    /// Declaration lists no resources
    #[error("\"permissions\" attribute is empty")]
    NoResources,

    /// A declared resource lists no entries
    #[error("[{resource_id}] \"resource\" attribute is empty")]
    NoEntries { resource_id: String },

    /// A declared resource has an empty id
    #[error("resource id must not be empty")]
    EmptyResourceId,

    /// Entry kind needs a principal but none was given
    #[error("[{resource_id}] {kind} entry is missing a principal")]
    MissingPrincipal { resource_id: String, kind: String },

    /// `anyone` entry carries a principal
    #[error("[{resource_id}] anyone entry must not name a principal (got {principal})")]
    UnexpectedPrincipal {
        resource_id: String,
        principal: String,
    },

    /// Same identity declared twice for one resource
    #[error("[{resource_id}] {identity} is declared more than once")]
    DuplicateDesired {
        resource_id: String,
        identity: String,
    },

    /// Remote store returned the same identity twice for one resource
    #[error("[{resource_id}] remote state lists {identity} more than once")]
    DuplicateObserved {
        resource_id: String,
        identity: String,
    },

    /// Observed entry returned without a remote id
    #[error("[{resource_id}] observed entry {entry} has no id")]
    MissingId { resource_id: String, entry: String },

    /// Same resource declared twice
    #[error("[{0}] is declared more than once")]
    DuplicateResource(String),
}

/// Result type for configuration validation
pub type Result<T> = std::result::Result<T, ConfigError>;
