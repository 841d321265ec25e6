//! Configuration module for webcheck

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Ports that indicate an HTTP(S) server, in reporting order
pub const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// Per-probe connect timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// DNS lookup bound in milliseconds
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 5000;

/// Capacity of the result stream
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 10;

/// Main configuration structure for a check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Candidate ports, probed and reported in this order
    pub ports: Vec<u16>,

    /// Timeout for each connection attempt in milliseconds
    pub timeout: u64,

    /// Timeout for the DNS lookup of a single host in milliseconds
    pub resolve_timeout: u64,

    /// Number of hosts checked at the same time
    pub workers: usize,

    /// Results buffered before workers wait on the consumer
    pub buffer_size: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            timeout: DEFAULT_TIMEOUT_MS,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT_MS,
            workers: default_workers(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Eight workers per core, never fewer than 32.
fn default_workers() -> usize {
    std::cmp::max(num_cpus::get() * 8, 32)
}

impl CheckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate ports
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Set the probe timeout in milliseconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the DNS lookup timeout in milliseconds
    pub fn with_resolve_timeout(mut self, resolve_timeout: u64) -> Self {
        self.resolve_timeout = resolve_timeout;
        self
    }

    /// Set the worker pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Get the probe timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Get the DNS lookup timeout as Duration
    pub fn resolve_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout)
    }

    /// Load configuration from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            crate::CheckError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: CheckConfig = toml::from_str(&content)
            .map_err(|e| crate::CheckError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from `~/.webcheck.toml`, falling back to defaults
    pub fn load_default_config() -> Self {
        let Some(home_dir) = dirs::home_dir() else {
            return Self::default();
        };

        let path = home_dir.join(".webcheck.toml");
        if !path.exists() {
            return Self::default();
        }

        match Self::from_toml_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.ports.is_empty() {
            return Err(crate::CheckError::ConfigError("No ports specified".to_string()));
        }

        if self.ports.contains(&0) {
            return Err(crate::CheckError::ConfigError("Port 0 cannot be probed".to_string()));
        }

        let mut seen = HashSet::with_capacity(self.ports.len());
        if let Some(dup) = self.ports.iter().find(|port| !seen.insert(**port)) {
            return Err(crate::CheckError::ConfigError(format!("Port {} listed twice", dup)));
        }

        if self.timeout == 0 {
            return Err(crate::CheckError::ConfigError("Timeout must be greater than 0".to_string()));
        }

        if self.resolve_timeout == 0 {
            return Err(crate::CheckError::ConfigError(
                "Resolve timeout must be greater than 0".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(crate::CheckError::ConfigError(
                "Worker count must be greater than 0".to_string(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(crate::CheckError::ConfigError(
                "Buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
