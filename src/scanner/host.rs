//! Checking a single host: resolve, then probe every address on every candidate port

use crate::config::CheckConfig;
use crate::error::ResolveError;
use crate::network::{HostResolver, PortProber};
use crate::scanner::HostCheckResult;
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs the check for one host at a time.
///
/// Within a host everything is sequential: one lookup, then one probe per
/// (address, port) pair. Parallelism only happens across hosts.
pub struct HostChecker {
    resolver: Arc<dyn HostResolver>,
    prober: Arc<dyn PortProber>,
    ports: Vec<u16>,
    resolve_timeout: Duration,
}

impl HostChecker {
    pub fn new(config: &CheckConfig, resolver: Arc<dyn HostResolver>, prober: Arc<dyn PortProber>) -> Self {
        Self {
            resolver,
            prober,
            ports: config.ports.clone(),
            resolve_timeout: config.resolve_timeout_duration(),
        }
    }

    /// Candidate ports in probe order
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Check one host. Never fails; a lookup error ends up on the result.
    pub async fn check(&self, host: &str) -> HostCheckResult {
        let start_time = Instant::now();
        log::debug!("{}: resolving", host);

        let addresses = match self.resolve(host).await {
            Ok(addresses) => addresses,
            Err(e) => {
                log::debug!("{}: resolution failed: {}", host, e);
                return HostCheckResult::unresolved(host, e);
            }
        };

        log::debug!("{}: resolved to {} address(es), probing", host, addresses.len());
        let open_ports = self.probe_all(&addresses).await;

        log::debug!(
            "{}: done, open ports {:?} [{}ms]",
            host,
            open_ports,
            start_time.elapsed().as_millis()
        );
        HostCheckResult::resolved(host, addresses, open_ports)
    }

    /// Bounded lookup. Duplicate addresses are dropped, first occurrence wins.
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let addresses = match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(host)).await {
            Ok(Ok(addresses)) => addresses,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(ResolveError::Timeout {
                    host: host.to_string(),
                    after: self.resolve_timeout,
                })
            }
        };

        let mut seen = HashSet::with_capacity(addresses.len());
        let addresses: Vec<IpAddr> = addresses.into_iter().filter(|ip| seen.insert(*ip)).collect();

        if addresses.is_empty() {
            return Err(ResolveError::NoAddresses { host: host.to_string() });
        }
        Ok(addresses)
    }

    /// A port counts as open if any address accepted it. Every pair is tried.
    async fn probe_all(&self, addresses: &[IpAddr]) -> Vec<u16> {
        let mut open = vec![false; self.ports.len()];

        for &ip in addresses {
            for (idx, &port) in self.ports.iter().enumerate() {
                if self.prober.probe(SocketAddr::new(ip, port)).await {
                    open[idx] = true;
                }
            }
        }

        self.ports
            .iter()
            .zip(open)
            .filter_map(|(&port, is_open)| is_open.then_some(port))
            .collect()
    }
}
