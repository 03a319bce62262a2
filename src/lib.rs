//! # Traffic Generator Library
//!
//! A concurrent multi-workload traffic-orchestration harness. It launches
//! independent external load generators against a target, coordinates their
//! relative start times, and aggregates their output into a per-workload report.
//!
//! ## Supported Workloads
//!
//! - **Bulk** (`iperf3`): multi-stream throughput test
//! - **Short** (`sockperf under-load`): latency at a fixed message rate
//! - **Flood** (`hping3`): raw SYN flood bounded by `timeout`, root only
//!
//! ## Architecture Overview
//!
//! - `harness`: wires preflight, composer and reporting for the binary
//! - `preflight`: fail fast when a required tool is not on the search path
//! - `workload`: immutable workload specs and each tool's command grammar
//! - `runner`: one runner per workload kind, turning a process outcome into a result
//! - `scenario`: timed scenario model and the concurrent composer
//! - `privilege`: raw packet privilege probe
//! - `report`: console reporter and JSON export of run results
//! - `counter`: pollable packet counter used by the `socketstat` binary
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use traffic_gen::{EffectiveUserProbe, Reporter, Scenario, ScenarioComposer, SystemExecutor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scenario = Scenario::mixed_bulk("10.0.0.5", 10)?;
//!     let mut composer =
//!         ScenarioComposer::new(Arc::new(SystemExecutor::new()), Arc::new(EffectiveUserProbe));
//!
//!     let report = composer.run(&scenario).await;
//!     Reporter::print(&report)?;
//!     Ok(())
//! }
//! ```

/// Command-line interface definitions for both binaries
pub mod cli;

/// Validated configuration built from the command line
pub mod config;

/// Pollable packet counter
///
/// Attaches to a network interface and reports a monotonically
/// non-decreasing packet count since attach.
pub mod counter;

pub mod error;

/// Process execution primitive
///
/// Spawns external tools with optional stream capture. Runners depend on the
/// `ProcessExecutor` trait so tests can count and script spawns.
pub mod exec;

/// Top-level wiring of preflight, composer and reporting
pub mod harness;

pub mod logging;

/// Preflight tool checks
pub mod preflight;

pub mod privilege;

/// Result types, console reporter and JSON export
///
/// Results are always reported in the order their workloads were declared,
/// regardless of which finished first.
pub mod report;

/// Workload runners
pub mod runner;

/// Scenario model and concurrent composer
///
/// Schedules one task per workload at its start offset and waits for every
/// task before the scenario counts as complete.
pub mod scenario;

pub mod utils;

/// Workload kinds, specs and command lines
pub mod workload;

pub use cli::{Args, Mode};
pub use config::HarnessConfig;
pub use error::HarnessError;
pub use exec::{ProcessExecutor, ProcessOutput, SystemExecutor};
pub use harness::Harness;
pub use preflight::{SearchPathResolver, ToolResolver};
pub use privilege::{EffectiveUserProbe, PrivilegeProbe};
pub use report::{Reporter, ResultsManager, RunResult, RunStatus, RunSummary, ScenarioReport};
pub use scenario::{Scenario, ScenarioComposer, ScenarioPlan};
pub use workload::{WorkloadKind, WorkloadSpec};

/// The current version of the traffic generator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// Timing offsets and tool parameters shared by the scenario builders and the
/// command grammars.
pub mod defaults {
    /// Default scenario duration in seconds
    pub const DURATION_SECS: u64 = 10;

    /// Pause between consecutive scenarios of the `all` mode, in seconds
    pub const SETTLE_GAP_SECS: u64 = 2;

    /// Delay before the latency probe starts in mixed scenarios
    ///
    /// The probe starts after the background load has ramped up so its
    /// readings reflect contention.
    pub const SHORT_START_OFFSET_SECS: u64 = 2;

    /// Extra seconds the mixed-flood probe ends before the flood's timeout
    pub const MIXED_FLOOD_MARGIN_SECS: u64 = 2;

    /// iperf3 parallel client streams (`-P`)
    pub const IPERF_PARALLEL_STREAMS: u32 = 4;

    /// sockperf target message rate (`--mps`)
    pub const SOCKPERF_MESSAGES_PER_SEC: u32 = 50;

    /// hping3 destination port (`-p`)
    pub const HPING_DEST_PORT: u16 = 80;

    /// hping3 payload size in bytes (`-d`)
    pub const HPING_PAYLOAD_BYTES: u32 = 120;

    /// Interface the packet counter attaches to by default
    pub const COUNTER_INTERFACE: &str = "ens33";

    /// Packet counter polling interval in seconds
    pub const COUNTER_INTERVAL_SECS: u64 = 1;
}
