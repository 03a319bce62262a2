//! # Results and Reporting
//!
//! Result types produced by the runners, the console [`Reporter`] and the
//! [`ResultsManager`] that keeps every scenario report of a run.
//!
//! ## Output
//!
//! - **Console**: one banner per scenario and one labeled block per workload,
//!   printed as soon as the scenario completes
//! - **JSON**: optional file written by [`ResultsManager::finalize`] with run
//!   metadata, host information, every report and a status summary

use crate::{utils, workload::WorkloadSpec};
use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Outcome category of one workload execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Success,
    ToolFailure,
    PermissionDenied,
    ToolMissing,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "Success"),
            RunStatus::ToolFailure => write!(f, "Tool Failure"),
            RunStatus::PermissionDenied => write!(f, "Permission Denied"),
            RunStatus::ToolMissing => write!(f, "Tool Missing"),
        }
    }
}

impl RunStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, RunStatus::Success)
    }
}

/// Result of running one workload. Created once by a runner and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub spec: WorkloadSpec,
    pub status: RunStatus,
    /// Captured stdout on success, diagnostic text on failure
    pub output: String,
}

impl RunResult {
    pub fn new(spec: WorkloadSpec, status: RunStatus, output: impl Into<String>) -> Self {
        Self {
            spec,
            status,
            output: output.into(),
        }
    }

    pub fn permission_denied(spec: WorkloadSpec) -> Self {
        let output = format!(
            "{} requires root privileges (raw packet injection)",
            spec.kind().label()
        );
        Self::new(spec, RunStatus::PermissionDenied, output)
    }
}

/// All results of one completed scenario, in declaration order
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub results: Vec<RunResult>,
    pub elapsed: Duration,
}

impl ScenarioReport {
    pub fn has_permission_denied(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.status == RunStatus::PermissionDenied)
    }
}

/// Console styles used by the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Banner,
    Heading,
    Success,
    Failure,
    Plain,
}

/// Apply a console style to `text`
pub fn paint(text: &str, style: Style) -> ColoredString {
    match style {
        Style::Banner => text.yellow().bold(),
        Style::Heading => text.cyan(),
        Style::Success => text.green(),
        Style::Failure => text.red(),
        Style::Plain => text.normal(),
    }
}

fn status_style(status: RunStatus) -> Style {
    if status.is_failure() {
        Style::Failure
    } else {
        Style::Success
    }
}

/// Renders scenario reports as labeled console blocks
pub struct Reporter;

impl Reporter {
    /// Write one banner for the scenario and one block per result.
    ///
    /// Blocks follow the order the workloads were declared in, never the
    /// order they finished in.
    ///
    /// ## Parameters
    /// - `report`: Completed scenario report
    /// - `out`: Destination writer (stdout in the binary, a buffer in tests)
    ///
    /// ## Returns
    /// - `Err(std::io::Error)`: Writing to `out` failed
    pub fn render<W: Write>(report: &ScenarioReport, out: &mut W) -> std::io::Result<()> {
        let banner = format!("=== SCENARIO: {} ===", report.scenario.to_uppercase());
        writeln!(out)?;
        writeln!(out, "{}", paint(&banner, Style::Banner))?;

        for result in &report.results {
            let heading = format!(
                ">>> {} [{}]",
                result.spec.kind().label(),
                result.spec.kind()
            );
            writeln!(out)?;
            writeln!(out, "{}", paint(&heading, Style::Heading))?;
            writeln!(
                out,
                "Status: {}",
                paint(&result.status.to_string(), status_style(result.status))
            )?;
            if !result.output.is_empty() {
                writeln!(out, "{}", result.output.trim_end())?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "{}",
            paint(
                &format!(
                    "Scenario '{}' finished in {}",
                    report.scenario,
                    utils::format_duration(report.elapsed)
                ),
                Style::Plain
            )
        )?;
        Ok(())
    }

    /// Render to standard output
    pub fn print(report: &ScenarioReport) -> Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        Self::render(report, &mut lock).context("Failed to write report to stdout")?;
        lock.flush()?;
        Ok(())
    }
}

/// Host information recorded with exported results
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub harness_version: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: utils::get_cpu_cores(),
            harness_version: crate::VERSION.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FinalResults<'a> {
    run_id: &'a str,
    target: &'a str,
    mode: &'a str,
    timestamp: chrono::DateTime<chrono::Utc>,
    system_info: SystemInfo,
    scenarios: &'a [ScenarioReport],
    summary: RunSummary,
}

/// Status counts across every scenario of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub tool_failure: usize,
    pub permission_denied: usize,
    pub tool_missing: usize,
}

/// Collects scenario reports for a run and optionally exports them as JSON
///
/// Reports are printed as they are added, so a long `all` run shows progress
/// scenario by scenario. The JSON file is only written by
/// [`ResultsManager::finalize`], once every scenario has finished.
pub struct ResultsManager {
    output_file: Option<PathBuf>,
    run_id: String,
    target: String,
    mode: String,
    reports: Vec<ScenarioReport>,
}

impl ResultsManager {
    /// Create an empty collector for one run.
    ///
    /// ## Parameters
    /// - `output_file`: JSON destination, `None` to skip the export
    /// - `target`: Target host recorded in the export metadata
    /// - `mode`: Mode name recorded in the export metadata
    pub fn new(output_file: Option<&Path>, target: &str, mode: &str) -> Self {
        Self {
            output_file: output_file.map(Path::to_path_buf),
            run_id: utils::generate_run_id(),
            target: target.to_string(),
            mode: mode.to_string(),
            reports: Vec::new(),
        }
    }

    /// Print a completed scenario and keep it for the final summary
    pub fn add_report(&mut self, report: ScenarioReport) -> Result<()> {
        debug!(
            "Adding {} results for scenario {}",
            report.results.len(),
            report.scenario
        );
        Reporter::print(&report)?;
        self.reports.push(report);
        Ok(())
    }

    pub fn reports(&self) -> &[ScenarioReport] {
        &self.reports
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for result in self.reports.iter().flat_map(|r| r.results.iter()) {
            summary.total += 1;
            match result.status {
                RunStatus::Success => summary.success += 1,
                RunStatus::ToolFailure => summary.tool_failure += 1,
                RunStatus::PermissionDenied => summary.permission_denied += 1,
                RunStatus::ToolMissing => summary.tool_missing += 1,
            }
        }
        summary
    }

    /// Write the JSON export if an output file was configured
    pub fn finalize(&self) -> Result<()> {
        let Some(ref output_file) = self.output_file else {
            return Ok(());
        };

        let final_results = FinalResults {
            run_id: &self.run_id,
            target: &self.target,
            mode: &self.mode,
            timestamp: chrono::Utc::now(),
            system_info: SystemInfo::collect(),
            scenarios: &self.reports,
            summary: self.summary(),
        };

        let json = serde_json::to_string_pretty(&final_results)?;
        std::fs::write(output_file, json)
            .with_context(|| format!("Failed to write results to {:?}", output_file))?;

        info!("Results written to: {:?}", output_file);
        Ok(())
    }
}
