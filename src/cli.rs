//! # Command-Line Interface
//!
//! Argument definitions for both binaries:
//! - [`Args`] for `traffic-gen`: target, experiment mode and timing
//! - [`SocketstatArgs`] for `socketstat`: interface and polling interval
//!
//! Defaults come from [`crate::defaults`] so the help text and the scenario
//! builders agree.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Traffic Generator - launch concurrent network workloads against a target
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Target IP address or hostname
    pub target: String,

    /// Experiment mode
    #[clap(short = 'm', long, value_enum, help_heading = "Core Options")]
    pub mode: Mode,

    /// Scenario duration in seconds
    #[clap(short = 'd', long, default_value_t = crate::defaults::DURATION_SECS, help_heading = "Core Options")]
    pub duration: u64,

    /// Pause in seconds between consecutive scenarios of the `all` mode
    #[clap(long, default_value_t = crate::defaults::SETTLE_GAP_SECS)]
    pub settle_gap: u64,

    /// Write a JSON summary of every run result to this file
    #[clap(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Also write log output to this file (no colors)
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Experiment modes, each expanding to one or more predefined scenarios
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Bulk throughput (iperf3)
    #[clap(name = "bulk")]
    Bulk,

    /// Short messages, latency under load (sockperf)
    #[clap(name = "short")]
    Short,

    /// Raw SYN flood (hping3, requires root)
    #[clap(name = "flood")]
    Flood,

    /// Bulk transfer with a latency probe nested inside it
    #[clap(name = "mixed_bulk")]
    MixedBulk,

    /// SYN flood with a latency probe nested inside it (requires root)
    #[clap(name = "mixed_flood")]
    MixedFlood,

    /// Every scenario above, in sequence
    #[clap(name = "all")]
    All,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Bulk => write!(f, "bulk"),
            Mode::Short => write!(f, "short"),
            Mode::Flood => write!(f, "flood"),
            Mode::MixedBulk => write!(f, "mixed_bulk"),
            Mode::MixedFlood => write!(f, "mixed_flood"),
            Mode::All => write!(f, "all"),
        }
    }
}

impl Mode {
    /// Expand the mode into the ordered list of single-scenario modes it runs
    pub fn expand_all(self) -> Vec<Mode> {
        match self {
            Mode::All => vec![
                Mode::Bulk,
                Mode::Short,
                Mode::Flood,
                Mode::MixedBulk,
                Mode::MixedFlood,
            ],
            other => vec![other],
        }
    }

    /// Scenario names this mode expands to, in execution order
    pub fn scenario_names(self) -> Vec<String> {
        self.expand_all().iter().map(|m| m.to_string()).collect()
    }
}

/// Packet counter poller - prints the socket-layer packet count every interval
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct SocketstatArgs {
    /// Network interface to attach the counter to
    #[clap(short = 'i', long, default_value = crate::defaults::COUNTER_INTERFACE)]
    pub interface: String,

    /// Polling interval in seconds
    #[clap(long, default_value_t = crate::defaults::COUNTER_INTERVAL_SECS)]
    pub interval: u64,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}
