//! Per-row upgrade scheduling and abort execution

pub mod abort;
pub mod outcome;
pub mod planner;

pub use abort::abort;
pub use outcome::{Outcome, OutcomeKind, OutcomeLog, Severity};
pub use planner::{plan, plan_and_submit, UpgradePlan};

/// Placeholder shown for a blank manifest cell in outcome messages
pub(crate) const BLANK_CELL: &str = "<blank>";
