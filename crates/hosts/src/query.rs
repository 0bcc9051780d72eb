//! Query-time username/port overrides.
//!
//! A query such as `root@web:2222` names a host (`web`) and forces a
//! username and port onto every candidate. Forcing changes identities,
//! so overridden hosts are de-duplicated again.

use crate::dedup::Deduplicator;
use crate::host::{Host, Overrides, is_valid_hostname};

/// Source label of the host built from the query itself.
pub const USER_INPUT_SOURCE: &str = "user input";

/// User input split into host text and overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    raw: String,
    text: String,
    username: Option<String>,
    port: Option<u16>,
}

impl Query {
    /// Parses `[user@]text[:port]`.
    ///
    /// Text before the first `@` is the username; text after the next `:`
    /// is the port, ignored if it is not a number.
    pub fn parse(input: &str) -> Self {
        let raw = input.trim();

        let (username, rest) = match raw.split_once('@') {
            Some((user, rest)) => (Some(user.to_string()), rest),
            None => (None, raw),
        };
        let (text, port) = match rest.split_once(':') {
            Some((text, port)) => (text, port.parse::<u16>().ok()),
            None => (rest, None),
        };

        Self {
            raw: raw.to_string(),
            text: text.to_string(),
            username: username.filter(|u| !u.is_empty()),
            port,
        }
    }

    /// The trimmed, unparsed input.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Host part of the query, used for matching.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Username and port to force onto candidate hosts.
    pub fn overrides(&self) -> Overrides {
        Overrides::new(self.username.clone(), self.port)
    }

    /// A host for the query text itself, if it is a valid hostname.
    pub fn input_host(&self) -> Option<Host> {
        if !is_valid_hostname(&self.text) {
            return None;
        }
        let mut host = Host::new(self.raw.as_str(), self.text.as_str())
            .with_port(self.port.unwrap_or_default())
            .with_source(USER_INPUT_SOURCE);
        if let Some(user) = &self.username {
            host = host.with_username(user.as_str());
        }
        Some(host)
    }

    /// Appends [`Query::input_host`] to already-overridden hosts unless its
    /// identity is taken.
    pub fn append_input_host(&self, mut hosts: Vec<Host>) -> Vec<Host> {
        if let Some(host) = self.input_host() {
            let mut seen = Deduplicator::new();
            for h in &hosts {
                seen.add(h);
            }
            if !seen.is_duplicate(&host) {
                hosts.push(host);
            }
        }
        hosts
    }
}

/// Applies `overrides` to every host, then drops hosts whose new identity
/// collides with an earlier one.
pub fn apply_overrides(hosts: &[Host], overrides: &Overrides) -> Vec<Host> {
    let mut seen = Deduplicator::new();
    hosts
        .iter()
        .map(|h| h.apply(overrides))
        .filter(|h| seen.insert(h))
        .collect()
}
