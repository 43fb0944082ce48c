//! Execution engine for permsync
//!
//! The engine orchestrates:
//! 1. Planning - Fetch current permissions and classify against the definition
//! 2. Diffing - Show the pending changes
//! 3. Executing - Apply changes concurrently through the Drive client

pub mod differ;
pub mod executor;
pub mod planner;

pub use differ::{display_plan, plan_json};
pub use executor::apply;
pub use planner::build_plan;
