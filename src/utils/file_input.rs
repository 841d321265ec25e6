//! Reading host lists from files
//!
//! One host name per line. Surrounding whitespace is trimmed, blank lines and
//! lines starting with `#` are skipped.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Host list reader
#[derive(Debug, Clone, Default)]
pub struct HostFileReader {
    deduplicate: bool,
    max_hosts: Option<usize>,
}

/// What happened while reading a host list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostListStats {
    pub total_lines: usize,
    pub hosts: usize,
    pub skipped_lines: usize,
    pub duplicates_removed: usize,
}

impl HostFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop repeated host names, keeping the first occurrence
    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Stop after this many hosts
    pub fn max_hosts(mut self, max_hosts: usize) -> Self {
        self.max_hosts = Some(max_hosts);
        self
    }

    /// Read hosts from a file
    pub fn read_hosts_from_file<P: AsRef<Path>>(&self, file_path: P) -> Result<(Vec<String>, HostListStats)> {
        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open host file: {:?}", file_path.as_ref()))?;

        self.read_hosts(BufReader::new(file))
            .with_context(|| format!("Failed to read host file: {:?}", file_path.as_ref()))
    }

    /// Read hosts from any line-oriented source
    pub fn read_hosts<R: BufRead>(&self, reader: R) -> Result<(Vec<String>, HostListStats)> {
        let mut hosts = Vec::new();
        let mut seen = HashSet::new();
        let mut stats = HostListStats::default();

        for line in reader.lines() {
            if self.max_hosts.is_some_and(|max| hosts.len() >= max) {
                break;
            }

            let line = line?;
            stats.total_lines += 1;

            let host = line.trim();
            if host.is_empty() || host.starts_with('#') {
                stats.skipped_lines += 1;
                continue;
            }

            if self.deduplicate && !seen.insert(host.to_string()) {
                stats.duplicates_removed += 1;
                continue;
            }

            hosts.push(host.to_string());
        }

        stats.hosts = hosts.len();
        Ok((hosts, stats))
    }
}

/// Read every host in `file_path`, keeping duplicates
pub fn hosts_from_file<P: AsRef<Path>>(file_path: P) -> Result<Vec<String>> {
    let (hosts, stats) = HostFileReader::new().read_hosts_from_file(&file_path)?;

    log::debug!(
        "{:?}: {} lines, {} hosts, {} skipped",
        file_path.as_ref(),
        stats.total_lines,
        stats.hosts,
        stats.skipped_lines
    );

    Ok(hosts)
}
