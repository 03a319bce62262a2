//! # Preflight Checks
//!
//! Verifies that every external load generator a plan needs is resolvable
//! before any workload starts. The check is advisory: a tool that is present
//! now may still fail at execution time, which is reported per workload as a
//! tool failure rather than caught here.

use crate::error::HarnessError;
use std::path::PathBuf;
use tracing::{debug, error};

/// Resolves a tool name to an executable path
pub trait ToolResolver: Send + Sync {
    fn resolve(&self, tool: &str) -> Option<PathBuf>;
}

/// Resolver that searches the executable search path (`PATH`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchPathResolver;

impl ToolResolver for SearchPathResolver {
    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// Return the tools from `required` that `resolver` cannot find.
///
/// Duplicates are reported once, in the order they first appear.
pub fn missing_tools<'a, I>(required: I, resolver: &dyn ToolResolver) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut missing: Vec<String> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for tool in required {
        if seen.contains(&tool) {
            continue;
        }
        seen.push(tool);

        match resolver.resolve(tool) {
            Some(path) => debug!("Found {} at {}", tool, path.display()),
            None => missing.push(tool.to_string()),
        }
    }

    missing
}

/// Fail fast when any required tool is missing
pub fn ensure_tools<'a, I>(required: I, resolver: &dyn ToolResolver) -> Result<(), HarnessError>
where
    I: IntoIterator<Item = &'a str>,
{
    let missing = missing_tools(required, resolver);
    if missing.is_empty() {
        return Ok(());
    }

    error!("Missing tools: {}", missing.join(", "));
    error!("Install them (iperf3, sockperf, hping3) before running the harness");
    Err(HarnessError::ToolsMissing(missing))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolver that knows a fixed set of tools
    struct FakeResolver(Vec<&'static str>);

    impl ToolResolver for FakeResolver {
        fn resolve(&self, tool: &str) -> Option<PathBuf> {
            self.0
                .iter()
                .find(|t| **t == tool)
                .map(|t| PathBuf::from("/usr/bin").join(t))
        }
    }

    #[test]
    fn test_missing_tools_reports_unresolved_subset() {
        let resolver = FakeResolver(vec!["sockperf"]);
        let missing = missing_tools(["iperf3", "sockperf", "hping3"], &resolver);
        assert_eq!(missing, vec!["iperf3", "hping3"]);
    }

    #[test]
    fn test_missing_tools_deduplicates() {
        let resolver = FakeResolver(vec![]);
        let missing = missing_tools(["iperf3", "iperf3", "timeout"], &resolver);
        assert_eq!(missing, vec!["iperf3", "timeout"]);
    }

    #[test]
    fn test_ensure_tools() {
        let resolver = FakeResolver(vec!["iperf3", "sockperf"]);
        assert!(ensure_tools(["iperf3", "sockperf"], &resolver).is_ok());
        assert_eq!(
            ensure_tools(["iperf3", "hping3"], &resolver),
            Err(HarnessError::ToolsMissing(vec!["hping3".into()]))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_search_path_resolver_finds_shell() {
        assert!(SearchPathResolver.resolve("sh").is_some());
        assert!(SearchPathResolver
            .resolve("definitely-not-a-real-binary-7f3a")
            .is_none());
    }
}
