//! # Reconcile
//!
//! Access-control reconciliation: compare the entries attached to remote
//! resources with a declared desired state, and converge the two.
//!
//! ## Core Concepts
//!
//! - **Entry**: one access grant (principal + kind + role), observed or desired
//! - **IdentityKey**: principal + kind; two entries with equal keys are the same grant
//! - **Classification**: per-resource NoChange / Update / Create / Delete buckets
//! - **ReconciliationPlan**: the buckets of every resource, in declaration order
//! - **Executor**: applies a plan through an [`AccessControlClient`]
//!
//! ## Example
//!
//! ```
//! use reconcile::{
//!     AccessControlClient, DesiredState, Entry, EntryKind, ExecuteOptions, MemoryClient,
//!     NoReport, ResourceSpec, Role, execute, observe, plan,
//! };
//!
//! let client = MemoryClient::new();
//! client.insert(
//!     "doc",
//!     vec![Entry::observed("p1", "bob@x.com", EntryKind::User, Role::Reader)],
//! );
//!
//! let desired = DesiredState::new(
//!     1,
//!     vec![ResourceSpec::new(
//!         "doc",
//!         vec![Entry::desired("bob@x.com", EntryKind::User, Role::Writer)],
//!     )?],
//! )?;
//!
//! let states = observe(&desired, &client, 4)?;
//! let plan = plan::build(&desired, &states)?;
//! assert_eq!(plan.updates().len(), 1);
//!
//! let report = execute(&plan, &client, &ExecuteOptions::default(), &mut NoReport)?;
//! assert!(report.is_success());
//! assert_eq!(client.list("doc")?[0].role, Role::Writer);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! - [`AccessControlClient`]: list/create/update/delete entries remotely
//! - [`DesiredStateSource`]: supplies the validated declaration
//! - [`ReportSink`]: receives one callback per action and per batch
//!
//! Classification is pure and never fails. Only loading the declaration,
//! observing remote state, and executing the plan touch the outside world.

pub mod action;
pub mod classify;
pub mod context;
pub mod entry;
pub mod error;
pub mod executor;
pub mod mock;
pub mod observe;
pub mod plan;
pub mod report;
pub mod types;

// Re-export main types at crate root
pub use action::{Action, ActionKind};
pub use classify::{Classification, classify, classify_resource};
pub use context::{AccessControlClient, CollectReport, DesiredStateSource, NoReport, ReportSink};
pub use entry::{Entry, EntryKind, IdentityKey, Role, identity_equals, needs_update};
pub use error::ConfigError;
pub use executor::execute;
pub use mock::{Call, MemoryClient};
pub use observe::observe;
pub use plan::{PlanSummary, ReconciliationPlan};
pub use report::{ExecutionReport, Outcome};
pub use types::{
    DesiredState, ExecuteOptions, ExecuteSummary, ResourceSpec, ResourceState, SUPPORTED_VERSION,
};
