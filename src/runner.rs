//! # Workload Runners
//!
//! One runner per traffic pattern. Each runner isolates one external tool's
//! capture policy and turns the process outcome into a [`RunResult`]:
//!
//! | Runner        | Output    | Non-zero exit  | Privilege      |
//! |---------------|-----------|----------------|----------------|
//! | `BulkRunner`  | captured  | tool failure   | not needed     |
//! | `ShortRunner` | captured  | tool failure   | not needed     |
//! | `FloodRunner` | discarded | still success  | root required  |
//!
//! A runner never returns an error: spawn failures become
//! [`RunStatus::ToolFailure`] so that one workload cannot abort its siblings.

use crate::{
    exec::ProcessExecutor,
    report::{RunResult, RunStatus},
    workload::{Capture, WorkloadKind, WorkloadSpec},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Executes one workload kind to completion
#[async_trait]
pub trait WorkloadRunner: Send + Sync {
    /// The workload kind this runner accepts
    fn kind(&self) -> WorkloadKind;

    /// Run the workload and wait for it to finish
    async fn run(&self, spec: WorkloadSpec) -> RunResult;
}

/// Throughput runner (iperf3)
pub struct BulkRunner {
    executor: Arc<dyn ProcessExecutor>,
}

/// Latency-under-load runner (sockperf)
pub struct ShortRunner {
    executor: Arc<dyn ProcessExecutor>,
}

/// Raw SYN flood runner (hping3 under `timeout`)
pub struct FloodRunner {
    executor: Arc<dyn ProcessExecutor>,
    privileged: bool,
}

impl BulkRunner {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor }
    }
}

impl ShortRunner {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor }
    }
}

impl FloodRunner {
    /// `privileged` is the result of a privilege probe taken by the caller.
    pub fn new(executor: Arc<dyn ProcessExecutor>, privileged: bool) -> Self {
        Self {
            executor,
            privileged,
        }
    }
}

#[async_trait]
impl WorkloadRunner for BulkRunner {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Bulk
    }

    async fn run(&self, spec: WorkloadSpec) -> RunResult {
        run_captured(self.executor.as_ref(), spec).await
    }
}

#[async_trait]
impl WorkloadRunner for ShortRunner {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Short
    }

    async fn run(&self, spec: WorkloadSpec) -> RunResult {
        run_captured(self.executor.as_ref(), spec).await
    }
}

#[async_trait]
impl WorkloadRunner for FloodRunner {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Flood
    }

    async fn run(&self, spec: WorkloadSpec) -> RunResult {
        let label = spec.kind().label();
        if !self.privileged {
            warn!("{} requires root, not starting", label);
            return RunResult::permission_denied(spec);
        }

        info!("[Starting] {}...", label);
        let command = spec.command_line();
        match self.executor.execute(&command, Capture::Discard).await {
            // `timeout` exits 124 when it stops the flood; that is the normal end.
            Ok(output) => {
                info!(
                    "[Done] {} (exit code {})",
                    label,
                    output
                        .exit_code
                        .map_or_else(|| "signal".to_string(), |c| c.to_string())
                );
                RunResult::new(spec, RunStatus::Success, "Flood complete")
            }
            Err(e) => {
                error!("[Error] {}: {}", label, e);
                RunResult::new(
                    spec,
                    RunStatus::ToolFailure,
                    format!("failed to run '{}': {}", command.program, e),
                )
            }
        }
    }
}

/// Run a capturing workload: stdout on success, stderr on failure
async fn run_captured(executor: &dyn ProcessExecutor, spec: WorkloadSpec) -> RunResult {
    let label = spec.kind().label();
    info!("[Starting] {}...", label);

    let command = spec.command_line();
    match executor.execute(&command, Capture::Capture).await {
        Ok(output) if output.success => {
            info!("[Done] {}", label);
            RunResult::new(spec, RunStatus::Success, output.stdout)
        }
        Ok(output) => {
            error!("[Failed] {} (exit code {:?})", label, output.exit_code);
            let diagnostic = if output.stderr.trim().is_empty() {
                match output.exit_code {
                    Some(code) => format!("{} exited with code {}", command.program, code),
                    None => format!("{} was terminated by a signal", command.program),
                }
            } else {
                output.stderr
            };
            RunResult::new(spec, RunStatus::ToolFailure, diagnostic)
        }
        Err(e) => {
            error!("[Error] {}: {}", label, e);
            RunResult::new(
                spec,
                RunStatus::ToolFailure,
                format!("failed to run '{}': {}", command.program, e),
            )
        }
    }
}

/// Runner factory keyed by workload kind
pub struct RunnerFactory;

impl RunnerFactory {
    /// Create the runner for `kind`
    pub fn create(
        kind: WorkloadKind,
        executor: Arc<dyn ProcessExecutor>,
        privileged: bool,
    ) -> Box<dyn WorkloadRunner> {
        match kind {
            WorkloadKind::Bulk => Box::new(BulkRunner::new(executor)),
            WorkloadKind::Short => Box::new(ShortRunner::new(executor)),
            WorkloadKind::Flood => Box::new(FloodRunner::new(executor, privileged)),
        }
    }
}
