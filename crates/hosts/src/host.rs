//! SSH host entry type.
//!
//! A [`Host`] is a connectable target together with the label of the source
//! it came from. All derived values (URLs, mosh command, identity) are pure
//! functions of the stored fields plus any query-time [`Overrides`].

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::LazyLock;
use url::Url;

/// Port assumed when none is given.
pub const DEFAULT_PORT: u16 = 22;

/// Source label of hosts built straight from a URL.
pub const URL_SOURCE: &str = "URL";

static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+$").expect("hostname pattern is valid"));

/// Returns `true` if `name` is an IP address or a plain DNS-style hostname.
///
/// Embedded ports, brackets and whitespace are rejected.
pub fn is_valid_hostname(name: &str) -> bool {
    name.parse::<IpAddr>().is_ok() || HOSTNAME_RE.is_match(name)
}

/// How a host renders its SSH URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// Plain target: URLs are built from the hostname and show any
    /// non-default user or port.
    #[default]
    Base,
    /// Entry from an ssh config file: the SSH URL points at the `Host`
    /// alias and only shows user/port when they were forced by a query,
    /// leaving everything else to `ssh` itself.
    Config,
}

/// Username and port supplied at query time.
///
/// Empty usernames and default ports are normalised away on construction,
/// so an `Overrides` only ever carries values that really force something.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Overrides {
    username: Option<String>,
    port: Option<u16>,
}

impl Overrides {
    pub fn new(username: Option<String>, port: Option<u16>) -> Self {
        Self {
            username: username.filter(|u| !u.is_empty()),
            port: port.filter(|p| *p != 0 && *p != DEFAULT_PORT),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns `true` if nothing is forced.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.port.is_none()
    }

    /// Values from `other` win where set.
    #[must_use]
    pub fn merge(&self, other: &Overrides) -> Overrides {
        Overrides {
            username: other.username.clone().or_else(|| self.username.clone()),
            port: other.port.or(self.port),
        }
    }
}

/// A host you can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    name: String,
    hostname: String,
    port: u16,
    username: Option<String>,
    source: String,
    kind: HostKind,
    overrides: Overrides,
}

impl Host {
    /// Creates a plain host on the default port with no username.
    pub fn new(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            port: DEFAULT_PORT,
            username: None,
            source: String::new(),
            kind: HostKind::Base,
            overrides: Overrides::default(),
        }
    }

    /// Creates a host that came from an ssh config `Host` block.
    pub fn config(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            kind: HostKind::Config,
            ..Self::new(name, hostname)
        }
    }

    /// Creates a plain host from an `ssh://[user@]host[:port]` URL.
    ///
    /// The display name is `[user@]host[:port]`, omitting the default port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `s` is not an absolute URL with a host.
    pub fn from_url(s: &str) -> Result<Self> {
        let url = Url::parse(s).map_err(|e| Error::invalid_url(s, e))?;
        let hostname = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::invalid_url(s, "URL has no host"))?;
        let hostname = hostname
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(hostname);

        let mut host = Self::new(String::new(), hostname)
            .with_port(url.port().unwrap_or(DEFAULT_PORT))
            .with_source(URL_SOURCE);
        if !url.username().is_empty() {
            host.username = Some(url.username().to_string());
        }

        let mut name = match &host.username {
            Some(user) => format!("{user}@{}", host.hostname),
            None => host.hostname.clone(),
        };
        if host.port != DEFAULT_PORT {
            name = format!("{name}:{}", host.port);
        }
        host.name = name;
        Ok(host)
    }

    /// Sets the stored port. `0` means "unset" and becomes [`DEFAULT_PORT`].
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = if port == 0 { DEFAULT_PORT } else { port };
        self
    }

    /// Sets the stored username. An empty string clears it.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.username = (!username.is_empty()).then_some(username);
        self
    }

    /// Sets the source label.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub(crate) fn set_source(&mut self, source: &str) {
        source.clone_into(&mut self.source);
    }

    /// Returns a copy with query-time overrides applied.
    ///
    /// Overrides accumulate: values already forced stay forced unless
    /// `overrides` replaces them. The identity of the returned host
    /// reflects every forced value.
    #[must_use]
    pub fn apply(&self, overrides: &Overrides) -> Self {
        Self {
            overrides: self.overrides.merge(overrides),
            ..self.clone()
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Network name or IP literal to connect to.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Effective port: the forced port if any, else the stored one.
    pub fn port(&self) -> u16 {
        self.overrides.port.unwrap_or(self.port)
    }

    /// Effective username: the forced one if any, else the stored one.
    pub fn username(&self) -> Option<&str> {
        self.overrides.username().or(self.username.as_deref())
    }

    /// Label of the source this host was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// Canonical `ssh://` URL built from the hostname.
    pub fn canonical_url(&self) -> String {
        self.canonical_url_for("ssh")
    }

    /// URL handed to an SSH client.
    pub fn ssh_url(&self) -> String {
        self.ssh_url_parts().0
    }

    /// Same target as [`Host::canonical_url`] with the `sftp` scheme.
    pub fn sftp_url(&self) -> String {
        self.canonical_url_for("sftp")
    }

    /// Shell command that opens this host with mosh.
    ///
    /// `path` is the mosh executable; empty means `mosh`.
    pub fn mosh_command(&self, path: &str) -> String {
        let mut cmd = if path.is_empty() { "mosh" } else { path }.to_string();
        cmd.push(' ');

        let (port, user, target) = match self.kind {
            HostKind::Base => (
                (self.port() != DEFAULT_PORT).then(|| self.port()),
                self.username(),
                self.hostname.as_str(),
            ),
            HostKind::Config => (
                self.overrides.port,
                self.overrides.username(),
                self.name.as_str(),
            ),
        };

        if let Some(port) = port {
            cmd.push_str(&format!("--ssh 'ssh -p {port}' "));
        }
        if let Some(user) = user {
            cmd.push_str(user);
            cmd.push('@');
        }
        cmd.push_str(target);
        cmd
    }

    /// Identity used for de-duplication: `name||url`.
    ///
    /// The URL is the SSH URL with `:port` appended when the effective port
    /// is not the default and the URL does not already carry it.
    pub fn uid(&self) -> String {
        let (url, has_port) = self.ssh_url_parts();
        if !has_port && self.port() != DEFAULT_PORT {
            format!("{}||{url}:{}", self.name, self.port())
        } else {
            format!("{}||{url}", self.name)
        }
    }

    fn canonical_url_for(&self, scheme: &str) -> String {
        let port = (self.port() != DEFAULT_PORT).then(|| self.port());
        format!(
            "{scheme}://{}",
            authority(self.username(), &self.hostname, port)
        )
    }

    /// Returns the SSH URL and whether its authority contains a port.
    fn ssh_url_parts(&self) -> (String, bool) {
        match self.kind {
            HostKind::Base => {
                let port = (self.port() != DEFAULT_PORT).then(|| self.port());
                let url = format!("ssh://{}", authority(self.username(), &self.hostname, port));
                (url, port.is_some())
            }
            HostKind::Config => {
                let port = self.overrides.port;
                let url = format!(
                    "ssh://{}",
                    authority(self.overrides.username(), &self.name, port)
                );
                (url, port.is_some())
            }
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ssh_url())
    }
}

/// `[user@]host[:port]`, bracketing IPv6 literals.
fn authority(username: Option<&str>, host: &str, port: Option<u16>) -> String {
    let mut out = String::new();
    if let Some(user) = username {
        out.push_str(user);
        out.push('@');
    }
    if host.parse::<Ipv6Addr>().is_ok() {
        out.push('[');
        out.push_str(host);
        out.push(']');
    } else {
        out.push_str(host);
    }
    if let Some(port) = port {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hostnames() {
        for name in ["localhost", "::1", "127.0.0.1", "google.com", "host.google.com"] {
            assert!(is_valid_hostname(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_hostnames() {
        for name in [
            "host.google.com:22",
            "127.0.0.1:22",
            "[::1]:22",
            "host_google_com",
            "host google com",
            "host google com:22",
            "",
        ] {
            assert!(!is_valid_hostname(name), "{name} should be invalid");
        }
    }

    #[test]
    fn test_port_zero_is_default() {
        let host = Host::new("a", "a").with_port(0);
        assert_eq!(host.port(), DEFAULT_PORT);
        assert_eq!(host, Host::new("a", "a"));
    }

    #[test]
    fn test_base_urls() {
        let host = Host::new("web", "web.example.com")
            .with_username("deploy")
            .with_port(2222);
        assert_eq!(host.ssh_url(), "ssh://deploy@web.example.com:2222");
        assert_eq!(host.canonical_url(), "ssh://deploy@web.example.com:2222");
        assert_eq!(host.sftp_url(), "sftp://deploy@web.example.com:2222");
        assert_eq!(host.uid(), "web||ssh://deploy@web.example.com:2222");
    }

    #[test]
    fn test_default_port_not_rendered() {
        let host = Host::new("web", "web.example.com");
        assert_eq!(host.ssh_url(), "ssh://web.example.com");
        assert_eq!(host.uid(), "web||ssh://web.example.com");
    }

    #[test]
    fn test_ipv6_is_bracketed() {
        let host = Host::new("::1", "::1").with_port(2222);
        assert_eq!(host.ssh_url(), "ssh://[::1]:2222");
    }

    #[test]
    fn test_config_host_uses_alias() {
        let host = Host::config("prod", "10.0.0.1")
            .with_username("root")
            .with_port(2222);
        assert_eq!(host.ssh_url(), "ssh://prod");
        assert_eq!(host.canonical_url(), "ssh://root@10.0.0.1:2222");
        assert_eq!(host.sftp_url(), "sftp://root@10.0.0.1:2222");
        // Stored non-default port still separates identities.
        assert_eq!(host.uid(), "prod||ssh://prod:2222");
    }

    #[test]
    fn test_config_host_forced_values_in_url() {
        let host = Host::config("prod", "10.0.0.1")
            .with_username("root")
            .apply(&Overrides::new(Some("admin".into()), Some(2200)));
        assert_eq!(host.ssh_url(), "ssh://admin@prod:2200");
        assert_eq!(host.username(), Some("admin"));
        assert_eq!(host.port(), 2200);
        assert_eq!(host.uid(), "prod||ssh://admin@prod:2200");
    }

    #[test]
    fn test_forcing_username_changes_uid() {
        let host = Host::config("prod", "prod");
        let forced = host.apply(&Overrides::new(Some("root".into()), None));
        assert_ne!(host.uid(), forced.uid());

        let base = Host::new("web", "web");
        let forced = base.apply(&Overrides::new(Some("root".into()), None));
        assert_ne!(base.uid(), forced.uid());
    }

    #[test]
    fn test_forcing_default_port_is_noop() {
        let host = Host::config("prod", "prod");
        let forced = host.apply(&Overrides::new(None, Some(22)));
        assert_eq!(host.uid(), forced.uid());
        assert!(forced.overrides().is_empty());
    }

    #[test]
    fn test_overrides_accumulate() {
        let host = Host::config("prod", "prod")
            .apply(&Overrides::new(Some("root".into()), None))
            .apply(&Overrides::new(None, Some(2222)));
        assert_eq!(host.ssh_url(), "ssh://root@prod:2222");

        let replaced = host.apply(&Overrides::new(Some("admin".into()), None));
        assert_eq!(replaced.ssh_url(), "ssh://admin@prod:2222");
        assert_ne!(replaced.uid(), host.uid());
    }

    #[test]
    fn test_mosh_command_base() {
        let host = Host::new("web", "web.example.com")
            .with_username("deploy")
            .with_port(2222);
        assert_eq!(
            host.mosh_command(""),
            "mosh --ssh 'ssh -p 2222' deploy@web.example.com"
        );
        assert_eq!(
            Host::new("web", "web").mosh_command("/usr/local/bin/mosh"),
            "/usr/local/bin/mosh web"
        );
    }

    #[test]
    fn test_mosh_command_config() {
        let host = Host::config("prod", "10.0.0.1")
            .with_username("root")
            .with_port(2222);
        assert_eq!(host.mosh_command("mosh"), "mosh prod");

        let forced = host.apply(&Overrides::new(Some("admin".into()), Some(2200)));
        assert_eq!(
            forced.mosh_command("mosh"),
            "mosh --ssh 'ssh -p 2200' admin@prod"
        );
    }

    #[test]
    fn test_from_url() {
        let host = Host::from_url("ssh://deploy@web.example.com:2222").unwrap();
        assert_eq!(host.name(), "deploy@web.example.com:2222");
        assert_eq!(host.hostname(), "web.example.com");
        assert_eq!(host.username(), Some("deploy"));
        assert_eq!(host.port(), 2222);
        assert_eq!(host.source(), URL_SOURCE);
        assert_eq!(host.kind(), HostKind::Base);
        assert_eq!(host.ssh_url(), "ssh://deploy@web.example.com:2222");
    }

    #[test]
    fn test_from_url_plain_and_ipv6() {
        let host = Host::from_url("ssh://example.com").unwrap();
        assert_eq!(host.name(), "example.com");
        assert_eq!(host.port(), DEFAULT_PORT);
        assert_eq!(host.username(), None);

        let host = Host::from_url("ssh://[::1]:2222").unwrap();
        assert_eq!(host.hostname(), "::1");
        assert_eq!(host.ssh_url(), "ssh://[::1]:2222");
    }

    #[test]
    fn test_from_url_rejects_garbage() {
        assert!(matches!(
            Host::from_url("example.com"),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(Host::from_url("ssh://").is_err());
    }

    #[test]
    fn test_display() {
        let host = Host::new("web", "web.example.com");
        assert_eq!(host.to_string(), "web (ssh://web.example.com)");
    }
}
