//! Application layer - resolution and transaction use cases.
//!
//! The planner turns package names into an [`InstallationPlan`]; the
//! transaction engine applies that plan to disk and the manifest.

mod planner;
mod transaction;

pub use planner::{DependencyPlanner, InstallationPlan, PlanItem, PlanReason};
pub use transaction::{
    ItemOutcome, ItemReport, TransactionEngine, TransactionMode, TransactionReport,
};
