//! # Harness Error Taxonomy
//!
//! Errors that decide whether the harness may start, or how the process
//! exits. Per-workload failures are *not* errors at this level: they are
//! recorded as a [`RunStatus`](crate::report::RunStatus) on the workload's
//! result so that sibling workloads keep running.

use thiserror::Error;

/// Fatal or exit-relevant failures raised by the orchestration core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarnessError {
    /// One or more external load generators could not be found on the search path.
    #[error("missing tools: {}", .0.join(", "))]
    ToolsMissing(Vec<String>),

    /// A privileged workload was requested but the process lacks raw packet privilege.
    #[error("{0} requires raw packet privilege (run as root)")]
    PrivilegeRequired(String),

    #[error("invalid target address '{0}'")]
    InvalidTarget(String),

    #[error("invalid duration {0}s: must be a positive number of seconds")]
    InvalidDuration(u64),

    /// Scenario construction rejected before any task starts.
    #[error("invalid scenario '{name}': {reason}")]
    InvalidScenario { name: String, reason: String },

    #[error("packet counter error on '{interface}': {reason}")]
    Counter { interface: String, reason: String },
}
