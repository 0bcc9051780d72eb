use crate::host::Host;
use std::collections::HashSet;

/// Recognises hosts whose identity has already been seen.
///
/// Identity is [`Host::uid`]. A fresh instance is used per pass; after
/// applying query overrides the caller must run a new pass, because
/// overriding a host changes its UID.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    tags: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a host with the same UID was added before.
    pub fn is_duplicate(&self, host: &Host) -> bool {
        self.tags.contains(&host.uid())
    }

    /// Records the host's UID.
    pub fn add(&mut self, host: &Host) {
        self.tags.insert(host.uid());
    }

    /// Records the host and returns `true` if it was not seen before.
    pub fn insert(&mut self, host: &Host) -> bool {
        self.tags.insert(host.uid())
    }

    /// Forgets the host's UID.
    pub fn remove(&mut self, host: &Host) {
        self.tags.remove(&host.uid());
    }

}

/// Removes duplicate hosts, keeping the first occurrence of each UID.
pub fn filter_duplicates(hosts: Vec<Host>) -> Vec<Host> {
    let mut seen = Deduplicator::new();
    hosts.into_iter().filter(|h| seen.insert(h)).collect()
}
