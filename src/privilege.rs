//! Privilege probing for raw packet workloads.

/// Answers whether the current process may inject raw packets
pub trait PrivilegeProbe: Send + Sync {
    fn has_raw_packet_privilege(&self) -> bool;
}

/// Probe based on the effective user id: only root may flood.
#[derive(Debug, Default, Clone, Copy)]
pub struct EffectiveUserProbe;

impl PrivilegeProbe for EffectiveUserProbe {
    #[cfg(unix)]
    fn has_raw_packet_privilege(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn has_raw_packet_privilege(&self) -> bool {
        false
    }
}

/// Fixed answer, for tests and dry runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPrivilege(pub bool);

impl PrivilegeProbe for StaticPrivilege {
    fn has_raw_packet_privilege(&self) -> bool {
        self.0
    }
}
