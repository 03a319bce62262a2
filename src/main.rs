//! # Traffic Generator - Main Entry Point
//!
//! Runs one experiment mode against a target:
//! 1. **Initialize logging**: colorized progress on stderr, optional log file
//! 2. **Parse arguments**: target, mode and duration
//! 3. **Build the plan**: invalid scenarios are rejected before anything runs
//! 4. **Preflight**: abort if a required load generator is missing
//! 5. **Run scenarios**: each scenario's workloads run concurrently
//! 6. **Report**: one labeled block per workload, optional JSON export
//!
//! ## Exit Status
//!
//! Non-zero when tools are missing or a privileged workload was denied.
//! Individual tool failures are reported but do not change the exit status.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use traffic_gen::{cli::Args, logging, Harness, HarnessConfig, HarnessError, ResultsManager};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

    info!("Starting traffic generator v{}", traffic_gen::VERSION);
    info!("Configuration: {:?}", args);

    let config = HarnessConfig::from_args(&args)?;

    let mut results_manager = ResultsManager::new(
        config.output_file.as_deref(),
        &config.target,
        &config.mode.to_string(),
    );

    let summary = Harness::system().run(&config, &mut results_manager).await?;
    results_manager.finalize()?;

    info!(
        "Completed {} workloads: {} succeeded, {} failed, {} denied",
        summary.total, summary.success, summary.tool_failure, summary.permission_denied
    );

    if summary.permission_denied > 0 {
        warn!("Flood workloads need root: re-run with sudo");
        return Err(HarnessError::PrivilegeRequired(config.mode.to_string()).into());
    }

    Ok(())
}
