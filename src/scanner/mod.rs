//! Scanner module: per-host checks and the engine that fans them out

pub mod engine;
pub mod host;

use crate::error::ResolveError;
use serde::{Serialize, Serializer};
use std::net::IpAddr;
use std::time::{Duration, Instant};

pub use engine::{CheckEngine, ResultStream};
pub use host::HostChecker;

/// Outcome of checking one host.
///
/// Either the lookup failed (`error` is set, no addresses, no ports) or it
/// produced at least one address and `open_ports` lists the candidate ports
/// that accepted a connection on any of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostCheckResult {
    name: String,
    addresses: Vec<IpAddr>,
    open_ports: Vec<u16>,
    #[serde(serialize_with = "serialize_error")]
    error: Option<ResolveError>,
}

impl HostCheckResult {
    /// Result for a host whose lookup failed. No probing happened.
    pub fn unresolved(name: impl Into<String>, error: ResolveError) -> Self {
        Self {
            name: name.into(),
            addresses: Vec::new(),
            open_ports: Vec::new(),
            error: Some(error),
        }
    }

    /// Result for a host that resolved to `addresses`.
    ///
    /// Callers guarantee `addresses` is non-empty and `open_ports` holds no
    /// duplicates.
    pub(crate) fn resolved(name: impl Into<String>, addresses: Vec<IpAddr>, open_ports: Vec<u16>) -> Self {
        debug_assert!(!addresses.is_empty());
        Self {
            name: name.into(),
            addresses,
            open_ports,
            error: None,
        }
    }

    /// Host name as given in the input
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved addresses in resolver order; empty if the lookup failed
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// Candidate ports that answered, in candidate order
    pub fn open_ports(&self) -> &[u16] {
        &self.open_ports
    }

    pub fn error(&self) -> Option<&ResolveError> {
        self.error.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.error.is_none()
    }

    /// At least one candidate port accepted a connection
    pub fn is_up(&self) -> bool {
        !self.open_ports.is_empty()
    }
}

fn serialize_error<S: Serializer>(error: &Option<ResolveError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Running totals over a result stream
#[derive(Debug, Clone)]
pub struct CheckSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub unresolved: usize,
    start_time: Instant,
    duration: Option<Duration>,
}

impl Default for CheckSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckSummary {
    pub fn new() -> Self {
        Self {
            total: 0,
            up: 0,
            down: 0,
            unresolved: 0,
            start_time: Instant::now(),
            duration: None,
        }
    }

    /// Count one result
    pub fn record(&mut self, result: &HostCheckResult) {
        self.total += 1;
        if !result.is_resolved() {
            self.unresolved += 1;
        } else if result.is_up() {
            self.up += 1;
        } else {
            self.down += 1;
        }
    }

    /// Stop the clock
    pub fn finish(&mut self) {
        self.duration = Some(self.start_time.elapsed());
    }

    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or_else(|| self.start_time.elapsed())
    }
}

impl std::fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hosts checked in {:.2}s: {} up, {} may be down, {} unresolved",
            self.total,
            self.duration().as_secs_f64(),
            self.up,
            self.down,
            self.unresolved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn loopback() -> Vec<IpAddr> {
        vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]
    }

    #[test]
    fn test_unresolved_result_has_no_addresses_or_ports() {
        let result = HostCheckResult::unresolved(
            "nope.invalid",
            ResolveError::NoAddresses { host: "nope.invalid".to_string() },
        );

        assert_eq!(result.name(), "nope.invalid");
        assert!(result.addresses().is_empty());
        assert!(result.open_ports().is_empty());
        assert!(result.error().is_some());
        assert!(!result.is_resolved());
        assert!(!result.is_up());
    }

    #[test]
    fn test_resolved_result() {
        let result = HostCheckResult::resolved("localhost", loopback(), vec![443]);
        assert!(result.is_resolved());
        assert!(result.is_up());
        assert_eq!(result.open_ports(), &[443]);
        assert!(result.error().is_none());
    }

    #[test]
    fn test_json_shape() {
        let result = HostCheckResult::resolved("localhost", loopback(), vec![80]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["name"], "localhost");
        assert_eq!(value["addresses"][0], "127.0.0.1");
        assert_eq!(value["open_ports"][0], 80);
        assert!(value["error"].is_null());

        let failed = HostCheckResult::unresolved("x.invalid", ResolveError::lookup("x.invalid", "no such host"));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["error"], "lookup x.invalid: no such host");
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = CheckSummary::new();
        summary.record(&HostCheckResult::resolved("a", loopback(), vec![80]));
        summary.record(&HostCheckResult::resolved("b", loopback(), vec![]));
        summary.record(&HostCheckResult::unresolved(
            "c",
            ResolveError::NoAddresses { host: "c".to_string() },
        ));
        summary.finish();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.up, 1);
        assert_eq!(summary.down, 1);
        assert_eq!(summary.unresolved, 1);
        assert!(summary.to_string().starts_with("3 hosts checked in "));
    }
}
