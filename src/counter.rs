//! # Packet Counter
//!
//! The harness treats the kernel-level packet counter as a black box with two
//! operations: attach to an interface, then read a count that never decreases.
//! [`InterfaceStatsCounter`] implements that contract on top of the kernel's
//! per-interface receive statistics in sysfs; the in-kernel probe itself is
//! not built here.

use crate::error::HarnessError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, warn};

/// Handle to an attached counter
#[derive(Debug)]
pub struct CounterHandle {
    interface: String,
    baseline: u64,
    last: AtomicU64,
}

impl CounterHandle {
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

/// A pollable packet counter
pub trait PacketCounter: Send + Sync {
    /// Start counting packets seen on `interface`
    fn attach(&self, interface: &str) -> Result<CounterHandle, HarnessError>;

    /// Packets counted since attach; never lower than a previous read
    fn read(&self, handle: &CounterHandle) -> Result<u64, HarnessError>;
}

/// Counter backed by `/sys/class/net/<interface>/statistics/rx_packets`
#[derive(Debug, Clone)]
pub struct InterfaceStatsCounter {
    sysfs_root: PathBuf,
}

impl Default for InterfaceStatsCounter {
    fn default() -> Self {
        Self::new("/sys/class/net")
    }
}

impl InterfaceStatsCounter {
    pub fn new(sysfs_root: impl AsRef<Path>) -> Self {
        Self {
            sysfs_root: sysfs_root.as_ref().to_path_buf(),
        }
    }

    fn stats_path(&self, interface: &str) -> PathBuf {
        self.sysfs_root
            .join(interface)
            .join("statistics")
            .join("rx_packets")
    }

    fn read_raw(&self, interface: &str) -> Result<u64, HarnessError> {
        let counter_error = |reason: String| HarnessError::Counter {
            interface: interface.to_string(),
            reason,
        };

        let path = self.stats_path(interface);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| counter_error(format!("cannot read {}: {}", path.display(), e)))?;
        text.trim()
            .parse::<u64>()
            .map_err(|e| counter_error(format!("malformed counter '{}': {}", text.trim(), e)))
    }
}

impl PacketCounter for InterfaceStatsCounter {
    fn attach(&self, interface: &str) -> Result<CounterHandle, HarnessError> {
        if interface.is_empty() || interface.contains('/') {
            return Err(HarnessError::Counter {
                interface: interface.to_string(),
                reason: "not a valid interface name".to_string(),
            });
        }

        let baseline = self.read_raw(interface)?;
        debug!("Attached to {} at rx_packets={}", interface, baseline);
        Ok(CounterHandle {
            interface: interface.to_string(),
            baseline,
            last: AtomicU64::new(0),
        })
    }

    fn read(&self, handle: &CounterHandle) -> Result<u64, HarnessError> {
        let raw = self.read_raw(&handle.interface)?;
        // Interface resets (driver reload) can move the raw value backwards.
        let since_attach = raw.saturating_sub(handle.baseline);
        let previous = handle.last.fetch_max(since_attach, Ordering::Relaxed);
        Ok(previous.max(since_attach))
    }
}

/// Poll `counter` every `period`, passing each reading to `sink`.
///
/// Runs until the caller drops the future (the `socketstat` binary races it
/// against Ctrl-C). A failed read is logged and skipped.
pub async fn poll_counter<F>(
    counter: &dyn PacketCounter,
    handle: &CounterHandle,
    period: Duration,
    mut sink: F,
) where
    F: FnMut(u64),
{
    let mut ticker = interval(period);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match counter.read(handle) {
            Ok(count) => sink(count),
            Err(e) => warn!("{}", e),
        }
    }
}
