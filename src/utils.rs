//! # Utility Functions and Helper Module
//!
//! Small helpers shared across the harness:
//!
//! - **Validation**: target address and duration checks with clear error messages
//! - **Formatting**: human-readable display of elapsed durations
//! - **System Information**: CPU count and run identifiers for exported results

use crate::error::HarnessError;
use std::net::IpAddr;
use std::time::Duration;
use uuid::Uuid;

/// Maximum length of a fully-qualified hostname
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single hostname label
const MAX_LABEL_LEN: usize = 63;

/// Generate a unique identifier for a harness run
///
/// Used to tag exported JSON results so that files from repeated runs
/// against the same target can be told apart.
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate that a target is a syntactically valid host or IP address
///
/// Accepts IPv4 and IPv6 literals, or a hostname made of dot-separated labels.
/// Each label is 1-63 characters of ASCII letters, digits or hyphens and may
/// not start or end with a hyphen. Name resolution is left to the tools.
///
/// ## Examples
///
/// ```rust
/// # use traffic_gen::utils::validate_target;
/// assert!(validate_target("10.0.0.5").is_ok());
/// assert!(validate_target("fe80::1").is_ok());
/// assert!(validate_target("iperf.example.net").is_ok());
/// assert!(validate_target("-bad-.example").is_err());
/// ```
pub fn validate_target(target: &str) -> Result<(), HarnessError> {
    if target.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let invalid = || HarnessError::InvalidTarget(target.to_string());

    let host = target.strip_suffix('.').unwrap_or(target);
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return Err(invalid());
    }

    for label in host.split('.') {
        let valid_label = !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid_label {
            return Err(invalid());
        }
    }

    // A name made only of digits and dots is a malformed IPv4 literal.
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validate that a workload or scenario duration is positive
pub fn validate_duration(duration_secs: u64) -> Result<(), HarnessError> {
    if duration_secs == 0 {
        return Err(HarnessError::InvalidDuration(duration_secs));
    }
    Ok(())
}

/// Format a duration in a human-readable way
///
/// Selects the most appropriate unit based on magnitude:
/// - **Milliseconds**: < 1 second (e.g., "250.00ms")
/// - **Seconds**: < 60 seconds (e.g., "5.25s")
/// - **Minutes and Hours**: longer durations (e.g., "1m 30s", "2h 15m 30s")
///
/// ```rust
/// # use traffic_gen::utils::format_duration;
/// # use std::time::Duration;
/// assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1_000 {
        format!("{:.2}ms", duration.as_secs_f64() * 1_000.0)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let seconds = duration.as_secs();
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;

        if minutes < 60 {
            format!("{}m {}s", minutes, remaining_seconds)
        } else {
            let hours = minutes / 60;
            let remaining_minutes = minutes % 60;
            format!("{}h {}m {}s", hours, remaining_minutes, remaining_seconds)
        }
    }
}

/// Get the number of logical CPU cores available to this process
pub fn get_cpu_cores() -> usize {
    num_cpus::get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_target_ip_literals() {
        assert!(validate_target("10.0.0.5").is_ok());
        assert!(validate_target("127.0.0.1").is_ok());
        assert!(validate_target("::1").is_ok());
        assert!(validate_target("2001:db8::42").is_ok());
    }

    #[test]
    fn test_validate_target_hostnames() {
        assert!(validate_target("localhost").is_ok());
        assert!(validate_target("perf-target-01.lab.example.com").is_ok());
        assert!(validate_target("example.com.").is_ok());

        assert!(validate_target("").is_err());
        assert!(validate_target("bad host").is_err());
        assert!(validate_target("under_score.example").is_err());
        assert!(validate_target("-leading.example").is_err());
        assert!(validate_target("a..b").is_err());
        assert!(validate_target(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_target_rejects_malformed_ipv4() {
        assert_eq!(
            validate_target("10.0.0.256"),
            Err(HarnessError::InvalidTarget("10.0.0.256".into()))
        );
        assert!(validate_target("10.0.0").is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(3600).is_ok());
        assert_eq!(validate_duration(0), Err(HarnessError::InvalidDuration(0)));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250.00ms");
        assert_eq!(format_duration(Duration::from_millis(5250)), "5.25s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(8130)), "2h 15m 30s");
    }

    #[test]
    fn test_generate_run_id_is_unique() {
        assert_ne!(generate_run_id(), generate_run_id());
        assert_eq!(generate_run_id().len(), 36);
    }

    #[test]
    fn test_get_cpu_cores() {
        assert!(get_cpu_cores() > 0);
    }
}
