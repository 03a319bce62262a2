//! # Process Execution
//!
//! The one place the harness touches the operating system's process table.
//! Runners talk to the [`ProcessExecutor`] trait so tests can substitute a
//! stub that records spawns and returns canned output.

use crate::workload::{Capture, CommandLine};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Exit information and captured streams of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// A successful exit with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed exit with the given code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Spawn-and-wait primitive used by every workload runner
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Spawn `command`, wait for it to exit, and return its exit status.
    ///
    /// Streams are piped back when `capture` is [`Capture::Capture`] and
    /// discarded otherwise. An `Err` means the process could not be spawned
    /// or waited on.
    async fn execute(&self, command: &CommandLine, capture: Capture) -> io::Result<ProcessOutput>;
}

/// Executor backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn execute(&self, command: &CommandLine, capture: Capture) -> io::Result<ProcessOutput> {
        debug!("Spawning: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        match capture {
            Capture::Capture => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
                let output = cmd.output().await?;
                Ok(ProcessOutput {
                    exit_code: output.status.code(),
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Capture::Discard => {
                cmd.stdout(Stdio::null());
                cmd.stderr(Stdio::null());
                let status = cmd.status().await?;
                Ok(ProcessOutput {
                    exit_code: status.code(),
                    success: status.success(),
                    ..Default::default()
                })
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_executor_captures_stdout() {
        let cmd = CommandLine::new("sh").arg("-c").arg("printf summary");
        let out = SystemExecutor::new()
            .execute(&cmd, Capture::Capture)
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout, "summary");
    }

    #[tokio::test]
    async fn test_system_executor_reports_failure_and_stderr() {
        let cmd = CommandLine::new("sh").arg("-c").arg("echo boom >&2; exit 3");
        let out = SystemExecutor::new()
            .execute(&cmd, Capture::Capture)
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn test_system_executor_discard_drops_output() {
        let cmd = CommandLine::new("sh").arg("-c").arg("echo noisy; exit 1");
        let out = SystemExecutor::new()
            .execute(&cmd, Capture::Discard)
            .await
            .unwrap();
        assert!(!out.success);
        assert!(out.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_system_executor_spawn_error() {
        let cmd = CommandLine::new("definitely-not-a-real-binary-7f3a");
        let result = SystemExecutor::new().execute(&cmd, Capture::Capture).await;
        assert!(result.is_err());
    }
}
