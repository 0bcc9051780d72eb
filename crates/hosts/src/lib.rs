//! Unified, de-duplicated directory of SSH hosts.
//!
//! Hosts are read from several independent [`Source`]s (ssh config files,
//! `known_hosts`, `/etc/hosts`, connection [`History`]) and merged by
//! [`Sources`] in priority order, keeping the first occurrence of every
//! [`Host::uid`].

mod dedup;
mod demo;
mod error;
mod history;
mod host;
pub mod parsers;
mod query;
mod source;
mod sources;

pub use dedup::{Deduplicator, filter_duplicates};
pub use demo::{DEMO_SOURCE, DemoSource};
pub use error::{Error, ParseError, Result};
pub use history::History;
pub use host::{DEFAULT_PORT, Host, HostKind, Overrides, URL_SOURCE, is_valid_hostname};
pub use query::{Query, USER_INPUT_SOURCE, apply_overrides};
pub use source::{FileSource, Format, Source};
pub use sources::{Sources, load_hosts};
