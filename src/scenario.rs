//! # Scenario Composition
//!
//! A scenario is a timed composition of workloads that run concurrently: each
//! entry carries an explicit start offset relative to the scenario start. The
//! [`ScenarioComposer`] spawns one task per entry, lets each sleep until its
//! offset, runs the workload, and joins every task before reporting.
//!
//! ## Predefined scenarios
//!
//! ```text
//! bulk         |== bulk (d) ==================|
//! short        |== short (d) =================|
//! flood        |== flood (d) =================|
//! mixed_bulk   |== bulk (d) ==================|
//!                  |== short (d-2) ===========|
//! mixed_flood  |== flood (d) =================|
//!                  |== short (d-4) =======|
//! ```
//!
//! The latency probe starts two seconds in so its readings reflect
//! contention. In `mixed_flood` it also finishes two seconds before the flood's
//! hard timeout.
//!
//! ## Lifecycle
//!
//! `Pending -> Running -> Complete`. The composer only reaches `Complete`
//! once every task has produced a result; a failed or denied workload never
//! prevents the others from being collected. Offsets are slept with
//! `tokio::time`, so tests can run scenarios on tokio's paused clock.

use crate::{
    cli::Mode,
    defaults,
    error::HarnessError,
    exec::ProcessExecutor,
    privilege::PrivilegeProbe,
    report::{RunResult, RunStatus, ScenarioReport},
    runner::RunnerFactory,
    workload::{WorkloadKind, WorkloadSpec},
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// One workload and the delay before it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledWorkload {
    pub spec: WorkloadSpec,
    pub offset: Duration,
}

/// Ordered set of scheduled workloads plus the scenario's total duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    entries: Vec<ScheduledWorkload>,
    total: Duration,
}

impl Scenario {
    /// Build a scenario, enforcing its scheduling invariants:
    /// - at least one entry, and at least one entry starting at offset zero
    /// - every offset is strictly less than the total duration
    /// - every workload finishes within the total duration
    pub fn new(
        name: impl Into<String>,
        entries: Vec<ScheduledWorkload>,
        total: Duration,
    ) -> Result<Self, HarnessError> {
        let name = name.into();
        let invalid = |reason: String| HarnessError::InvalidScenario {
            name: name.clone(),
            reason,
        };

        if entries.is_empty() {
            return Err(invalid("no workloads scheduled".to_string()));
        }
        if !entries.iter().any(|e| e.offset.is_zero()) {
            return Err(invalid("no workload starts at offset 0".to_string()));
        }
        for entry in &entries {
            if entry.offset >= total {
                return Err(invalid(format!(
                    "{} offset {:?} is not within the {:?} scenario",
                    entry.spec.kind(),
                    entry.offset,
                    total
                )));
            }
            let end = entry
                .offset
                .checked_add(Duration::from_secs(entry.spec.duration_secs()))
                .ok_or_else(|| {
                    invalid(format!(
                        "{} end time overflows the scenario clock",
                        entry.spec.kind()
                    ))
                })?;
            if end > total {
                return Err(invalid(format!(
                    "{} runs until {:?}, past the {:?} scenario",
                    entry.spec.kind(),
                    end,
                    total
                )));
            }
        }

        Ok(Self {
            name,
            entries,
            total,
        })
    }

    fn single(
        name: &str,
        kind: WorkloadKind,
        target: &str,
        duration_secs: u64,
    ) -> Result<Self, HarnessError> {
        let spec = WorkloadSpec::new(kind, target, duration_secs)?;
        Self::new(
            name,
            vec![ScheduledWorkload {
                spec,
                offset: Duration::ZERO,
            }],
            Duration::from_secs(duration_secs),
        )
    }

    pub fn bulk(target: &str, duration_secs: u64) -> Result<Self, HarnessError> {
        Self::single("bulk", WorkloadKind::Bulk, target, duration_secs)
    }

    pub fn short(target: &str, duration_secs: u64) -> Result<Self, HarnessError> {
        Self::single("short", WorkloadKind::Short, target, duration_secs)
    }

    pub fn flood(target: &str, duration_secs: u64) -> Result<Self, HarnessError> {
        Self::single("flood", WorkloadKind::Flood, target, duration_secs)
    }

    /// Bulk transfer for `duration_secs`, latency probe from 2s for `duration_secs - 2`
    pub fn mixed_bulk(target: &str, duration_secs: u64) -> Result<Self, HarnessError> {
        let offset = defaults::SHORT_START_OFFSET_SECS;
        Self::mixed(
            "mixed_bulk",
            WorkloadKind::Bulk,
            target,
            duration_secs,
            offset,
        )
    }

    /// SYN flood for `duration_secs`, latency probe from 2s for `duration_secs - 4`
    pub fn mixed_flood(target: &str, duration_secs: u64) -> Result<Self, HarnessError> {
        let offset = defaults::SHORT_START_OFFSET_SECS;
        Self::mixed(
            "mixed_flood",
            WorkloadKind::Flood,
            target,
            duration_secs,
            offset + defaults::MIXED_FLOOD_MARGIN_SECS,
        )
    }

    /// Background workload at offset 0 plus a short probe at the fixed start
    /// offset, running for `duration_secs - shortened_by`.
    fn mixed(
        name: &str,
        background: WorkloadKind,
        target: &str,
        duration_secs: u64,
        shortened_by: u64,
    ) -> Result<Self, HarnessError> {
        if duration_secs <= shortened_by {
            return Err(HarnessError::InvalidScenario {
                name: name.to_string(),
                reason: format!(
                    "duration must exceed {}s (got {}s)",
                    shortened_by, duration_secs
                ),
            });
        }

        let entries = vec![
            ScheduledWorkload {
                spec: WorkloadSpec::new(background, target, duration_secs)?,
                offset: Duration::ZERO,
            },
            ScheduledWorkload {
                spec: WorkloadSpec::new(WorkloadKind::Short, target, duration_secs - shortened_by)?,
                offset: Duration::from_secs(defaults::SHORT_START_OFFSET_SECS),
            },
        ];
        Self::new(name, entries, Duration::from_secs(duration_secs))
    }

    /// Build the predefined scenario for a single (non-`all`) mode
    pub fn for_mode(mode: Mode, target: &str, duration_secs: u64) -> Result<Self, HarnessError> {
        match mode {
            Mode::Bulk => Self::bulk(target, duration_secs),
            Mode::Short => Self::short(target, duration_secs),
            Mode::Flood => Self::flood(target, duration_secs),
            Mode::MixedBulk => Self::mixed_bulk(target, duration_secs),
            Mode::MixedFlood => Self::mixed_flood(target, duration_secs),
            Mode::All => Err(HarnessError::InvalidScenario {
                name: mode.to_string(),
                reason: "'all' must be expanded into a plan".to_string(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[ScheduledWorkload] {
        &self.entries
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn requires_privilege(&self) -> bool {
        self.entries.iter().any(|e| e.spec.requires_privilege())
    }
}

/// Scenarios to run in sequence, separated by a settling gap
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub scenarios: Vec<Scenario>,
    pub settle_gap: Duration,
}

impl ScenarioPlan {
    /// Build every scenario a mode expands to.
    ///
    /// All scenarios are constructed up front, so an invalid duration for any
    /// one of them rejects the whole plan before anything runs.
    pub fn from_mode(
        mode: Mode,
        target: &str,
        duration_secs: u64,
        settle_gap: Duration,
    ) -> Result<Self, HarnessError> {
        let scenarios = mode
            .expand_all()
            .into_iter()
            .map(|m| Scenario::for_mode(m, target, duration_secs))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scenarios,
            settle_gap,
        })
    }

    /// Union of the tools every workload in the plan needs, first-seen order
    pub fn required_tools(&self) -> Vec<&'static str> {
        let mut tools: Vec<&'static str> = Vec::new();
        for entry in self.scenarios.iter().flat_map(|s| s.entries.iter()) {
            for tool in entry.spec.kind().required_tools() {
                if !tools.contains(tool) {
                    tools.push(*tool);
                }
            }
        }
        tools
    }

    pub fn requires_privilege(&self) -> bool {
        self.scenarios.iter().any(Scenario::requires_privilege)
    }
}

/// Lifecycle of the composer for the scenario it is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Pending,
    Running,
    Complete,
}

/// A slot per scheduled workload, filled in declaration order
enum Slot {
    /// Resolved without spawning work
    Ready(RunResult),
    Spawned(WorkloadSpec, JoinHandle<RunResult>),
}

/// Runs scenarios: one concurrent task per workload, joined before reporting
pub struct ScenarioComposer {
    executor: Arc<dyn ProcessExecutor>,
    privilege: Arc<dyn PrivilegeProbe>,
    state: ComposerState,
}

impl ScenarioComposer {
    pub fn new(executor: Arc<dyn ProcessExecutor>, privilege: Arc<dyn PrivilegeProbe>) -> Self {
        Self {
            executor,
            privilege,
            state: ComposerState::Pending,
        }
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Run every workload of `scenario` and collect one result per workload.
    ///
    /// Privileged workloads are resolved to `PermissionDenied` up front when
    /// the process lacks privilege; the remaining workloads still run.
    pub async fn run(&mut self, scenario: &Scenario) -> ScenarioReport {
        self.state = ComposerState::Running;
        info!(
            "Starting scenario '{}' ({} workloads, {:?})",
            scenario.name,
            scenario.entries.len(),
            scenario.total
        );

        let privileged =
            scenario.requires_privilege() && self.privilege.has_raw_packet_privilege();
        let start = Instant::now();

        let slots: Vec<Slot> = scenario
            .entries
            .iter()
            .map(|entry| self.schedule(entry, privileged))
            .collect();

        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            let result = match slot {
                Slot::Ready(result) => result,
                Slot::Spawned(spec, handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Workload task for {} failed: {}", spec.kind(), e);
                        RunResult::new(
                            spec,
                            RunStatus::ToolFailure,
                            format!("workload task failed: {}", e),
                        )
                    }
                },
            };
            results.push(result);
        }

        self.state = ComposerState::Complete;
        let elapsed = start.elapsed();
        info!("Scenario '{}' complete in {:?}", scenario.name, elapsed);

        ScenarioReport {
            scenario: scenario.name.clone(),
            results,
            elapsed,
        }
    }

    fn schedule(&self, entry: &ScheduledWorkload, privileged: bool) -> Slot {
        let spec = entry.spec.clone();
        if spec.requires_privilege() && !privileged {
            warn!(
                "{} skipped: raw packet privilege missing",
                spec.kind().label()
            );
            return Slot::Ready(RunResult::permission_denied(spec));
        }

        let runner = RunnerFactory::create(spec.kind(), self.executor.clone(), privileged);
        let offset = entry.offset;
        let task_spec = spec.clone();
        let handle = tokio::spawn(async move {
            if !offset.is_zero() {
                debug!("{} waiting {:?} before start", task_spec.kind(), offset);
                sleep(offset).await;
            }
            runner.run(task_spec).await
        });
        Slot::Spawned(spec, handle)
    }

    /// Run every scenario of `plan` in order, handing each report to
    /// `on_report` as soon as its scenario completes.
    pub async fn run_plan<F>(&mut self, plan: &ScenarioPlan, mut on_report: F) -> Result<()>
    where
        F: FnMut(ScenarioReport) -> Result<()>,
    {
        for (i, scenario) in plan.scenarios.iter().enumerate() {
            if i > 0 && !plan.settle_gap.is_zero() {
                info!("Settling for {:?} before next scenario...", plan.settle_gap);
                sleep(plan.settle_gap).await;
            }
            self.state = ComposerState::Pending;
            let report = self.run(scenario).await;
            on_report(report)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ProcessOutput;
    use crate::privilege::StaticPrivilege;
    use crate::workload::{Capture, CommandLine};
    use async_trait::async_trait;
    use std::io;
    use std::sync::Mutex;

    /// Executor whose tools take a fixed virtual time and record completion order
    struct TimedExecutor {
        delays: Vec<(&'static str, Duration)>,
        started: Mutex<Vec<(CommandLine, Duration)>>,
        finished: Mutex<Vec<String>>,
        origin: Instant,
    }

    impl TimedExecutor {
        fn new(delays: Vec<(&'static str, Duration)>) -> Self {
            Self {
                delays,
                started: Mutex::new(Vec::new()),
                finished: Mutex::new(Vec::new()),
                origin: Instant::now(),
            }
        }

        fn started_programs(&self) -> Vec<String> {
            self.started
                .lock()
                .unwrap()
                .iter()
                .map(|(c, _)| c.program.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ProcessExecutor for TimedExecutor {
        async fn execute(&self, command: &CommandLine, _capture: Capture) -> io::Result<ProcessOutput> {
            self.started
                .lock()
                .unwrap()
                .push((command.clone(), self.origin.elapsed()));
            let delay = self
                .delays
                .iter()
                .find(|(p, _)| *p == command.program)
                .map(|(_, d)| *d)
                .unwrap_or_default();
            sleep(delay).await;
            self.finished.lock().unwrap().push(command.program.clone());
            Ok(ProcessOutput::ok(format!("{} output", command.program)))
        }
    }

    fn composer(exec: Arc<TimedExecutor>, privileged: bool) -> ScenarioComposer {
        ScenarioComposer::new(exec, Arc::new(StaticPrivilege(privileged)))
    }

    #[test]
    fn test_mixed_bulk_schedule() {
        let scenario = Scenario::mixed_bulk("10.0.0.5", 10).unwrap();
        let entries = scenario.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].spec.kind(), WorkloadKind::Bulk);
        assert_eq!(entries[0].offset, Duration::ZERO);
        assert_eq!(entries[0].spec.duration_secs(), 10);
        assert_eq!(entries[1].spec.kind(), WorkloadKind::Short);
        assert_eq!(entries[1].offset, Duration::from_secs(2));
        assert_eq!(entries[1].spec.duration_secs(), 8);
    }

    #[test]
    fn test_mixed_flood_schedule() {
        let scenario = Scenario::mixed_flood("10.0.0.5", 10).unwrap();
        let entries = scenario.entries();
        assert_eq!(entries[0].spec.kind(), WorkloadKind::Flood);
        assert_eq!(entries[1].offset, Duration::from_secs(2));
        assert_eq!(entries[1].spec.duration_secs(), 6);
        assert!(scenario.requires_privilege());
    }

    #[test]
    fn test_mixed_bulk_rejects_short_durations() {
        for d in [0, 1, 2] {
            assert!(matches!(
                Scenario::mixed_bulk("10.0.0.5", d),
                Err(HarnessError::InvalidScenario { .. })
            ));
        }
        assert!(Scenario::mixed_bulk("10.0.0.5", 3).is_ok());
    }

    #[test]
    fn test_mixed_flood_rejects_non_positive_probe() {
        assert!(Scenario::mixed_flood("10.0.0.5", 4).is_err());
        assert!(Scenario::mixed_flood("10.0.0.5", 5).is_ok());
    }

    #[test]
    fn test_scenario_invariants() {
        let spec = WorkloadSpec::new(WorkloadKind::Bulk, "10.0.0.5", 5).unwrap();
        let late = ScheduledWorkload {
            spec: spec.clone(),
            offset: Duration::from_secs(1),
        };
        assert!(Scenario::new("x", vec![], Duration::from_secs(5)).is_err());
        assert!(Scenario::new("x", vec![late.clone()], Duration::from_secs(10)).is_err());

        let first = ScheduledWorkload {
            spec,
            offset: Duration::ZERO,
        };
        let past_end = ScheduledWorkload {
            spec: WorkloadSpec::new(WorkloadKind::Short, "10.0.0.5", 1).unwrap(),
            offset: Duration::from_secs(5),
        };
        assert!(Scenario::new("x", vec![first.clone(), past_end], Duration::from_secs(5)).is_err());
        assert!(Scenario::new("x", vec![first, late], Duration::from_secs(6)).is_ok());
    }

    #[test]
    fn test_scenario_end_overflow_is_rejected() {
        let forever = |kind, offset| ScheduledWorkload {
            spec: WorkloadSpec::new(kind, "10.0.0.5", u64::MAX).unwrap(),
            offset: Duration::from_secs(offset),
        };
        let entries = vec![
            forever(WorkloadKind::Bulk, 0),
            forever(WorkloadKind::Short, 1),
        ];

        let err = Scenario::new("x", entries, Duration::from_secs(u64::MAX)).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidScenario { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_plan_for_all_mode() {
        let plan =
            ScenarioPlan::from_mode(Mode::All, "10.0.0.5", 10, Duration::from_secs(2)).unwrap();
        let names: Vec<&str> = plan.scenarios.iter().map(Scenario::name).collect();
        assert_eq!(
            names,
            vec!["bulk", "short", "flood", "mixed_bulk", "mixed_flood"]
        );
        assert_eq!(
            plan.required_tools(),
            vec!["iperf3", "sockperf", "hping3", "timeout"]
        );
        assert!(plan.requires_privilege());

        assert!(ScenarioPlan::from_mode(Mode::All, "10.0.0.5", 4, Duration::ZERO).is_err());
    }

    #[test]
    fn test_plan_tools_follow_mode() {
        let plan = ScenarioPlan::from_mode(Mode::Bulk, "10.0.0.5", 10, Duration::ZERO).unwrap();
        assert_eq!(plan.required_tools(), vec!["iperf3"]);
        assert!(!plan.requires_privilege());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_declaration_order() {
        // Short finishes first: bulk runs 10s from t=0, short 1s from t=2.
        let exec = Arc::new(TimedExecutor::new(vec![
            ("iperf3", Duration::from_secs(10)),
            ("sockperf", Duration::from_secs(1)),
        ]));
        let mut composer = composer(exec.clone(), false);
        assert_eq!(composer.state(), ComposerState::Pending);

        let scenario = Scenario::mixed_bulk("10.0.0.5", 10).unwrap();
        let report = composer.run(&scenario).await;

        assert_eq!(composer.state(), ComposerState::Complete);
        assert_eq!(*exec.finished.lock().unwrap(), vec!["sockperf", "iperf3"]);
        let kinds: Vec<WorkloadKind> = report.results.iter().map(|r| r.spec.kind()).collect();
        assert_eq!(kinds, vec![WorkloadKind::Bulk, WorkloadKind::Short]);
        assert_eq!(report.results[0].output, "iperf3 output");
    }

    /// Executor that panics inside the workload task for one program
    struct PanickingExecutor(&'static str);

    #[async_trait]
    impl ProcessExecutor for PanickingExecutor {
        async fn execute(&self, command: &CommandLine, _capture: Capture) -> io::Result<ProcessOutput> {
            if command.program == self.0 {
                panic!("{} crashed", command.program);
            }
            Ok(ProcessOutput::ok(format!("{} output", command.program)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_task_keeps_its_slot() {
        let mut composer = ScenarioComposer::new(
            Arc::new(PanickingExecutor("iperf3")),
            Arc::new(StaticPrivilege(false)),
        );

        let report = composer
            .run(&Scenario::mixed_bulk("10.0.0.5", 10).unwrap())
            .await;

        let outcome: Vec<(WorkloadKind, RunStatus)> = report
            .results
            .iter()
            .map(|r| (r.spec.kind(), r.status))
            .collect();
        assert_eq!(
            outcome,
            vec![
                (WorkloadKind::Bulk, RunStatus::ToolFailure),
                (WorkloadKind::Short, RunStatus::Success),
            ]
        );
        assert!(report.results[0].output.starts_with("workload task failed"));
        assert_eq!(composer.state(), ComposerState::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offsets_are_honoured() {
        let exec = Arc::new(TimedExecutor::new(vec![]));
        let mut composer = composer(exec.clone(), false);

        composer
            .run(&Scenario::mixed_bulk("10.0.0.5", 10).unwrap())
            .await;

        let started = exec.started.lock().unwrap();
        let sockperf = started.iter().find(|(c, _)| c.program == "sockperf").unwrap();
        let iperf = started.iter().find(|(c, _)| c.program == "iperf3").unwrap();
        assert!(iperf.1 < Duration::from_millis(100));
        assert!(sockperf.1 >= Duration::from_secs(2));
        assert!(sockperf.0.args.contains(&"8".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_flood_without_privilege_still_runs_probe() {
        let exec = Arc::new(TimedExecutor::new(vec![("sockperf", Duration::from_secs(6))]));
        let mut composer = composer(exec.clone(), false);

        let report = composer
            .run(&Scenario::mixed_flood("10.0.0.5", 10).unwrap())
            .await;

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].status, RunStatus::PermissionDenied);
        assert_eq!(report.results[0].spec.kind(), WorkloadKind::Flood);
        assert_eq!(report.results[1].status, RunStatus::Success);
        assert_eq!(report.results[1].spec.kind(), WorkloadKind::Short);
        assert_eq!(exec.started_programs(), vec!["sockperf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_flood_with_privilege_spawns_both() {
        let exec = Arc::new(TimedExecutor::new(vec![("timeout", Duration::from_secs(10))]));
        let mut composer = composer(exec.clone(), true);

        let report = composer
            .run(&Scenario::mixed_flood("10.0.0.5", 10).unwrap())
            .await;

        assert!(report.results.iter().all(|r| r.status == RunStatus::Success));
        let mut programs = exec.started_programs();
        programs.sort();
        assert_eq!(programs, vec!["sockperf", "timeout"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_plan_reports_every_scenario_in_order() {
        let exec = Arc::new(TimedExecutor::new(vec![]));
        let mut composer = composer(exec.clone(), false);
        let plan =
            ScenarioPlan::from_mode(Mode::All, "10.0.0.5", 10, Duration::from_secs(2)).unwrap();

        let mut reports = Vec::new();
        composer
            .run_plan(&plan, |report| {
                reports.push(report);
                Ok(())
            })
            .await
            .unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.scenario.as_str()).collect();
        assert_eq!(
            names,
            vec!["bulk", "short", "flood", "mixed_bulk", "mixed_flood"]
        );
        let counts: Vec<usize> = reports.iter().map(|r| r.results.len()).collect();
        assert_eq!(counts, vec![1, 1, 1, 2, 2]);
        assert!(!exec.started_programs().contains(&"timeout".to_string()));
    }
}
