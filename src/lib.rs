//! webcheck - is anything serving HTTP(S) on these hosts?
//!
//! Resolves a list of host names and probes every resolved address on the
//! candidate ports (80 and 443 by default) with plain TCP connects. Hosts are
//! checked concurrently by a bounded worker pool and their results are
//! streamed back as soon as each one finishes.
//!
//! ```no_run
//! use futures::StreamExt;
//! use webcheck::{CheckConfig, CheckEngine};
//!
//! # async fn run() -> webcheck::Result<()> {
//! let engine = CheckEngine::new(CheckConfig::default())?;
//! let mut results = engine.check_all(["localhost", "example.com"]);
//! while let Some(result) = results.next().await {
//!     println!("{} up={}", result.name(), result.is_up());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod output;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::CheckConfig;
pub use error::{CheckError, ResolveError};
pub use network::{HostResolver, PortProber, SystemResolver, TcpProber};
pub use scanner::{CheckEngine, CheckSummary, HostCheckResult, ResultStream};

pub type Result<T> = std::result::Result<T, CheckError>;
