//! Utility modules

pub mod file_input;

pub use file_input::{hosts_from_file, HostFileReader, HostListStats};
