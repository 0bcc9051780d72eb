//! Remembered connections.
//!
//! History is a [`Source`] that can also be changed: hosts are added and
//! removed explicitly and every change is written straight back to disk as
//! a pretty-printed JSON array of `ssh://` URLs.

use crate::dedup::Deduplicator;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::source::Source;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file-persisted list of previously opened hosts.
#[derive(Debug)]
pub struct History {
    name: String,
    path: PathBuf,
    priority: i32,
    hosts: Option<Vec<Host>>,
    dedup: Deduplicator,
    // set when a read failed open; `hosts` stays `None` so writes reload
    unreadable: bool,
}

impl History {
    /// Creates a history backed by `path`. Nothing is read until the hosts
    /// are first needed or [`History::load`] is called.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            priority,
            hosts: None,
            dedup: Deduplicator::new(),
            unreadable: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the history file, replacing anything in memory.
    ///
    /// A missing file is an empty history. Duplicate and unparseable
    /// entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON array of strings.
    pub fn load(&mut self) -> Result<()> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(source = %self.name, "no history at {}", self.path.display());
                self.dedup = Deduplicator::new();
                self.hosts = Some(Vec::new());
                self.unreadable = false;
                return Ok(());
            }
            Err(source) => {
                return Err(Error::Persistence {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let urls: Vec<String> =
            serde_json::from_str(&data).map_err(|source| Error::HistoryFormat {
                path: self.path.clone(),
                source,
            })?;

        let mut dedup = Deduplicator::new();
        let mut hosts = Vec::with_capacity(urls.len());
        for url in &urls {
            let host = match Host::from_url(url) {
                Ok(host) => host.with_source(self.name.as_str()),
                Err(e) => {
                    warn!(source = %self.name, "skipping history entry: {e}");
                    continue;
                }
            };
            if dedup.insert(&host) {
                hosts.push(host);
            }
        }

        info!(
            source = %self.name,
            "[source/load/history] {} host(s)",
            hosts.len()
        );
        self.dedup = dedup;
        self.hosts = Some(hosts);
        self.unreadable = false;
        Ok(())
    }

    /// Writes the current hosts to disk, readable by the owner only.
    ///
    /// The existing file is loaded first if that has not happened yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing history cannot be loaded or the
    /// file cannot be written.
    pub fn save(&mut self) -> Result<()> {
        self.ensure_loaded()?;
        self.write()
    }

    fn write(&self) -> Result<()> {
        let hosts = self.hosts.as_deref().unwrap_or_default();
        let urls: Vec<String> = hosts.iter().map(Host::ssh_url).collect();
        let data = serde_json::to_string_pretty(&urls).map_err(|source| Error::HistoryFormat {
            path: self.path.clone(),
            source,
        })?;

        write_private(&self.path, data.as_bytes()).map_err(|source| Error::Persistence {
            path: self.path.clone(),
            source,
        })?;

        info!("saved {} host(s) to history", urls.len());
        Ok(())
    }

    /// Remembers a host. Returns `false` if it was already remembered.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing history cannot be loaded or the
    /// updated history cannot be saved.
    pub fn add(&mut self, host: &Host) -> Result<bool> {
        self.ensure_loaded()?;

        if self.dedup.is_duplicate(host) {
            info!("[history/{}] ignoring duplicate: {host}", self.path.display());
            return Ok(false);
        }

        let host = host.clone().with_source(self.name.as_str());
        self.dedup.add(&host);
        info!("adding {} to history", host.name());
        self.hosts.get_or_insert_with(Vec::new).push(host);

        self.write()?;
        Ok(true)
    }

    /// Forgets the first entry with the same name and SSH URL as `host`.
    /// Returns `false` if there was no such entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing history cannot be loaded or the
    /// updated history cannot be saved.
    pub fn remove(&mut self, host: &Host) -> Result<bool> {
        self.ensure_loaded()?;

        let hosts = self.hosts.get_or_insert_with(Vec::new);
        let ssh_url = host.ssh_url();
        let Some(index) = hosts
            .iter()
            .position(|h| h.name() == host.name() && h.ssh_url() == ssh_url)
        else {
            info!("not in history: {host}");
            return Ok(false);
        };

        let removed = hosts.remove(index);
        self.dedup.remove(&removed);
        info!("removed '{}' from history", removed.name());

        self.write()?;
        Ok(true)
    }

    /// Remembers the host described by an `ssh://` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is invalid or the history cannot be updated.
    pub fn add_url(&mut self, url: &str) -> Result<bool> {
        self.add(&Host::from_url(url)?)
    }

    /// Forgets the host described by an `ssh://` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is invalid or the history cannot be updated.
    pub fn remove_url(&mut self, url: &str) -> Result<bool> {
        self.remove(&Host::from_url(url)?)
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.hosts.is_none() {
            self.load()?;
        }
        Ok(())
    }
}

impl Source for History {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn hosts(&mut self) -> &[Host] {
        if self.hosts.is_none()
            && !self.unreadable
            && let Err(e) = self.load()
        {
            warn!(source = %self.name, "{e}");
            self.unreadable = true;
        }
        self.hosts.as_deref().unwrap_or_default()
    }
}

/// Writes `data` to `path` with mode 0600, creating parent directories.
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        // mode() only applies to newly created files
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(data)
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(data)
    }
}
