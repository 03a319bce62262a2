//! # Workload Definitions
//!
//! A workload is one network traffic pattern generated against a target by an
//! external tool. This module owns the immutable [`WorkloadSpec`] and the
//! per-kind command grammar of each tool:
//!
//! - **Bulk**: `iperf3` multi-stream throughput test
//! - **Short**: `sockperf under-load` latency probe at a fixed message rate
//! - **Flood**: `hping3` SYN flood bounded by coreutils `timeout`
//!
//! Adding a new workload kind means adding a variant here and a runner in
//! [`crate::runner`]; the scenario composer never looks at command lines.

use crate::{defaults, error::HarnessError, utils};
use serde::Serialize;

/// Traffic pattern kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WorkloadKind {
    Bulk,
    Short,
    Flood,
}

/// How a runner treats the standard streams of its tool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capture {
    /// Pipe stdout and stderr back to the runner
    Capture,
    /// Send both streams to the null device
    Discard,
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadKind::Bulk => write!(f, "Bulk"),
            WorkloadKind::Short => write!(f, "Short"),
            WorkloadKind::Flood => write!(f, "Flood"),
        }
    }
}

impl WorkloadKind {
    /// Human-readable label used in progress logs and report blocks
    pub fn label(&self) -> &'static str {
        match self {
            WorkloadKind::Bulk => "Bulk Traffic (iperf3)",
            WorkloadKind::Short => "Short Traffic (sockperf)",
            WorkloadKind::Flood => "Flood Traffic (hping3)",
        }
    }

    /// The load generator this kind drives
    pub fn tool(&self) -> &'static str {
        match self {
            WorkloadKind::Bulk => "iperf3",
            WorkloadKind::Short => "sockperf",
            WorkloadKind::Flood => "hping3",
        }
    }

    /// Every binary that must be resolvable for this kind to run
    pub fn required_tools(&self) -> &'static [&'static str] {
        match self {
            WorkloadKind::Bulk => &["iperf3"],
            WorkloadKind::Short => &["sockperf"],
            WorkloadKind::Flood => &["hping3", "timeout"],
        }
    }

    /// Raw packet injection needs elevated privilege
    pub fn requires_privilege(&self) -> bool {
        matches!(self, WorkloadKind::Flood)
    }

    pub fn capture(&self) -> Capture {
        match self {
            WorkloadKind::Flood => Capture::Discard,
            WorkloadKind::Bulk | WorkloadKind::Short => Capture::Capture,
        }
    }
}

/// A single workload to run: kind, target, and duration in seconds.
///
/// Constructed only through [`WorkloadSpec::new`], which validates the target
/// and duration; there are no setters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkloadSpec {
    kind: WorkloadKind,
    target: String,
    duration_secs: u64,
    requires_privilege: bool,
}

impl WorkloadSpec {
    pub fn new(
        kind: WorkloadKind,
        target: impl Into<String>,
        duration_secs: u64,
    ) -> Result<Self, HarnessError> {
        let target = target.into();
        utils::validate_target(&target)?;
        utils::validate_duration(duration_secs)?;

        Ok(Self {
            kind,
            target,
            duration_secs,
            requires_privilege: kind.requires_privilege(),
        })
    }

    pub fn kind(&self) -> WorkloadKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn requires_privilege(&self) -> bool {
        self.requires_privilege
    }

    /// Build the external command line for this workload
    pub fn command_line(&self) -> CommandLine {
        let duration = self.duration_secs.to_string();
        match self.kind {
            WorkloadKind::Bulk => CommandLine::new("iperf3")
                .arg("-c")
                .arg(&self.target)
                .arg("-t")
                .arg(duration)
                .arg("-P")
                .arg(defaults::IPERF_PARALLEL_STREAMS.to_string()),
            WorkloadKind::Short => CommandLine::new("sockperf")
                .arg("under-load")
                .arg("-i")
                .arg(&self.target)
                .arg("--tcp")
                .arg("-t")
                .arg(duration)
                .arg("--mps")
                .arg(defaults::SOCKPERF_MESSAGES_PER_SEC.to_string()),
            // The flood is bounded by `timeout`, not by the runner.
            WorkloadKind::Flood => CommandLine::new("timeout")
                .arg(duration)
                .arg("hping3")
                .arg("--flood")
                .arg("-S")
                .arg("-p")
                .arg(defaults::HPING_DEST_PORT.to_string())
                .arg("-d")
                .arg(defaults::HPING_PAYLOAD_BYTES.to_string())
                .arg(&self.target),
        }
    }
}

/// Program plus arguments, detached from any process handle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
