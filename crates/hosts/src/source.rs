//! Host sources.
//!
//! A [`Source`] is a named, prioritised provider of hosts. File-backed
//! sources parse their file lazily on first access and cache the result
//! for the lifetime of the instance.

use crate::host::Host;
use crate::parsers::{ParseFn, hosts_file, known_hosts, ssh_config};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Provides hosts.
pub trait Source: fmt::Debug {
    /// Display name of the source, also used as each host's source label.
    fn name(&self) -> &str;

    /// Lower numbers win when sources provide the same host.
    fn priority(&self) -> i32;

    /// Hosts contained by the source.
    ///
    /// Computed on first call and cached. Never fails: an unreadable or
    /// malformed file yields whatever could be parsed, possibly nothing.
    fn hosts(&mut self) -> &[Host];
}

/// File formats a [`FileSource`] can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    SshConfig,
    KnownHosts,
    HostsFile,
}

impl Format {
    fn parser(self) -> ParseFn {
        match self {
            Format::SshConfig => ssh_config::parse,
            Format::KnownHosts => known_hosts::parse,
            Format::HostsFile => hosts_file::parse,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::SshConfig => "config",
            Format::KnownHosts => "known_hosts",
            Format::HostsFile => "hosts",
        })
    }
}

/// A source backed by one file in one of the supported [`Format`]s.
#[derive(Debug)]
pub struct FileSource {
    name: String,
    path: PathBuf,
    priority: i32,
    format: Format,
    hosts: Option<Vec<Host>>,
}

impl FileSource {
    pub fn new(
        format: Format,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            priority,
            format,
            hosts: None,
        }
    }

    /// Source for an ssh config-formatted file.
    pub fn ssh_config(path: impl Into<PathBuf>, name: impl Into<String>, priority: i32) -> Self {
        Self::new(Format::SshConfig, path, name, priority)
    }

    /// Source for a `known_hosts`-formatted file.
    pub fn known_hosts(path: impl Into<PathBuf>, name: impl Into<String>, priority: i32) -> Self {
        Self::new(Format::KnownHosts, path, name, priority)
    }

    /// Source for a hosts-formatted file.
    pub fn hosts_file(path: impl Into<PathBuf>, name: impl Into<String>, priority: i32) -> Self {
        Self::new(Format::HostsFile, path, name, priority)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    fn load(&self) -> Vec<Host> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    source = %self.name,
                    "cannot read {}: {e}",
                    self.path.display()
                );
                return Vec::new();
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        if matches!(content, Cow::Owned(_)) {
            warn!(source = %self.name, "{} is not valid UTF-8", self.path.display());
        }

        let mut hosts = (self.format.parser())(&content, &self.name);
        for host in &mut hosts {
            host.set_source(&self.name);
        }
        info!(
            source = %self.name,
            "[source/load/{}] {} host(s)",
            self.format,
            hosts.len()
        );
        hosts
    }
}

impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn hosts(&mut self) -> &[Host] {
        if self.hosts.is_none() {
            self.hosts = Some(self.load());
        }
        self.hosts.as_deref().unwrap_or_default()
    }
}
