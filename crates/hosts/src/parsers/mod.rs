//! Pure parsers turning file content into [`Host`](crate::Host) values.
//!
//! Parsers never fail: malformed lines and invalid hostnames are logged
//! with the file label and skipped. Source labels are assigned later by the
//! owning [`Source`](crate::Source).

pub mod hosts_file;
pub mod known_hosts;
pub mod ssh_config;

/// A parser over the whole content of one file.
pub type ParseFn = fn(content: &str, label: &str) -> Vec<crate::Host>;
