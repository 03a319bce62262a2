//! # Harness Configuration
//!
//! Turns parsed command-line arguments into a validated [`HarnessConfig`].
//! Every check that can fail without touching the network or spawning a
//! process happens here: target syntax, duration bounds and the schedule of
//! each planned scenario.

use crate::{
    cli::{Args, Mode},
    scenario::ScenarioPlan,
    utils,
};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Validated harness configuration
///
/// Built from the parsed command line. Construction validates the target and
/// duration and builds the complete scenario plan, so an invalid mixed
/// scenario is rejected before preflight checks or any workload starts.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub target: String,
    pub mode: Mode,
    pub duration_secs: u64,
    pub settle_gap: Duration,
    pub output_file: Option<PathBuf>,
    pub plan: ScenarioPlan,
}

impl HarnessConfig {
    /// Build the configuration for one run from parsed arguments.
    ///
    /// ## Parameters
    /// - `args`: Parsed command-line arguments
    ///
    /// ## Returns
    /// - `Ok(HarnessConfig)`: Validated configuration with its scenario plan
    /// - `Err(anyhow::Error)`: Wraps a [`crate::HarnessError`] for an invalid
    ///   target, a zero duration, or a mixed scenario too short to schedule
    ///
    /// For `--mode all` every scenario is built here, so one invalid scenario
    /// rejects the whole run.
    pub fn from_args(args: &Args) -> Result<Self> {
        utils::validate_target(&args.target)?;
        utils::validate_duration(args.duration)?;

        let settle_gap = Duration::from_secs(args.settle_gap);
        let plan = ScenarioPlan::from_mode(args.mode, &args.target, args.duration, settle_gap)?;
        debug!(
            "Plan for mode {}: {:?}",
            args.mode,
            plan.scenarios.iter().map(|s| s.name()).collect::<Vec<_>>()
        );

        Ok(Self {
            target: args.target.clone(),
            mode: args.mode,
            duration_secs: args.duration,
            settle_gap,
            output_file: args.output_file.clone(),
            plan,
        })
    }
}
