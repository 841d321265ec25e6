//! Error handling for webcheck
//!
//! Two layers of failure exist. [`CheckError`] covers everything that can go
//! wrong before a run starts (bad configuration, unreadable input). Once hosts
//! are dispatched nothing is fatal: a failed DNS lookup is recorded on the
//! host's own result as a [`ResolveError`] and the remaining hosts carry on.

use std::time::Duration;
use thiserror::Error;

/// Main error type for setting up a check run
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Why a host name could not be turned into addresses.
///
/// Stored on [`HostCheckResult`](crate::scanner::HostCheckResult), so it is
/// cheap to clone and compares by value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("lookup {host}: {reason}")]
    Lookup { host: String, reason: String },

    #[error("lookup {}: timed out after {}ms", .host, .after.as_millis())]
    Timeout { host: String, after: Duration },

    #[error("lookup {host}: no addresses found")]
    NoAddresses { host: String },
}

impl ResolveError {
    pub fn lookup(host: &str, reason: impl ToString) -> Self {
        ResolveError::Lookup {
            host: host.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Host name the failed lookup was for
    pub fn host(&self) -> &str {
        match self {
            ResolveError::Lookup { host, .. }
            | ResolveError::Timeout { host, .. }
            | ResolveError::NoAddresses { host } => host,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ResolveError::Timeout { .. })
    }
}
