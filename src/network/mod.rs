//! Network module: DNS lookups and TCP liveness probes
//!
//! These are the only parts of webcheck that talk to the network. Both sit
//! behind a trait so the scanner can be driven by any resolver or prober.

pub mod probe;
pub mod resolve;

pub use probe::{PortProber, TcpProber};
pub use resolve::{HostResolver, SystemResolver};
