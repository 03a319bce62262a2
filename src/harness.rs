//! # Harness
//!
//! Top-level wiring used by the `traffic-gen` binary.
//!
//! ## Run Lifecycle
//!
//! 1. **Preflight**: resolve every tool the plan needs; abort if any is missing
//! 2. **Compose**: run each scenario of the plan through a [`ScenarioComposer`]
//! 3. **Collect**: hand each finished report to the [`ResultsManager`]

use crate::{
    config::HarnessConfig,
    exec::{ProcessExecutor, SystemExecutor},
    preflight::{self, SearchPathResolver, ToolResolver},
    privilege::{EffectiveUserProbe, PrivilegeProbe},
    report::{ResultsManager, RunSummary},
    scenario::ScenarioComposer,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Wires the external collaborators together and runs a configured plan
///
/// The collaborators are trait objects so tests can substitute a resolver
/// that hides tools, an executor that counts spawns, or a fixed privilege.
pub struct Harness {
    resolver: Arc<dyn ToolResolver>,
    executor: Arc<dyn ProcessExecutor>,
    privilege: Arc<dyn PrivilegeProbe>,
}

impl Harness {
    pub fn new(
        resolver: Arc<dyn ToolResolver>,
        executor: Arc<dyn ProcessExecutor>,
        privilege: Arc<dyn PrivilegeProbe>,
    ) -> Self {
        Self {
            resolver,
            executor,
            privilege,
        }
    }

    /// Harness backed by `PATH` lookup, real processes and the effective uid
    pub fn system() -> Self {
        Self::new(
            Arc::new(SearchPathResolver),
            Arc::new(SystemExecutor::new()),
            Arc::new(EffectiveUserProbe),
        )
    }

    /// Preflight the plan, then run every scenario, adding each report to
    /// `results` as it completes.
    ///
    /// ## Parameters
    /// - `config`: Validated configuration carrying the scenario plan
    /// - `results`: Collector that prints and keeps each scenario report
    ///
    /// ## Returns
    /// - `Ok(RunSummary)`: Status counts across every scenario that ran
    /// - `Err(anyhow::Error)`: [`crate::HarnessError::ToolsMissing`] before any
    ///   workload starts, or an I/O error while printing a report
    ///
    /// Workload failures and permission denials are part of the summary,
    /// never an error.
    pub async fn run(
        &self,
        config: &HarnessConfig,
        results: &mut ResultsManager,
    ) -> Result<RunSummary> {
        preflight::ensure_tools(config.plan.required_tools(), self.resolver.as_ref())?;

        info!(
            "Running mode '{}' against {} for {}s",
            config.mode, config.target, config.duration_secs
        );

        let mut composer = ScenarioComposer::new(self.executor.clone(), self.privilege.clone());
        composer
            .run_plan(&config.plan, |report| results.add_report(report))
            .await?;

        Ok(results.summary())
    }
}
