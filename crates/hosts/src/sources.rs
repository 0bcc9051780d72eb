//! Priority-ordered aggregation of host sources.

use crate::dedup::filter_duplicates;
use crate::host::{Host, Overrides};
use crate::query::apply_overrides;
use crate::source::Source;
use tracing::{debug, info};

/// An explicit, caller-built set of sources.
///
/// Sources are visited in ascending priority order; when two sources
/// provide hosts with the same UID, the higher-priority (lower number)
/// source wins.
#[derive(Debug, Default)]
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source. Insertion order does not matter, priority does.
    pub fn push(&mut self, source: impl Source + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Builder-style [`Sources::push`].
    #[must_use]
    pub fn with(mut self, source: impl Source + 'static) -> Self {
        self.push(source);
        self
    }

    /// Names of the sources in priority order.
    pub fn names(&mut self) -> Vec<&str> {
        self.sort();
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Returns all hosts from all sources, de-duplicated.
    ///
    /// Hosts keep the order their sources were visited in.
    pub fn hosts(&mut self) -> Vec<Host> {
        self.sort();

        let mut hosts = Vec::new();
        for source in &mut self.sources {
            let provided = source.hosts();
            let count = provided.len();
            hosts.extend_from_slice(provided);
            debug!(source = source.name(), priority = source.priority(), "{count} host(s)");
        }

        let total = hosts.len();
        let hosts = filter_duplicates(hosts);
        let dupes = total - hosts.len();
        if dupes > 0 {
            info!("{dupes} duplicate(s) ignored");
        }
        hosts
    }

    fn sort(&mut self) {
        // stable: equal priorities keep insertion order
        self.sources.sort_by_key(|s| s.priority());
    }
}

/// Loads hosts from all sources and applies query overrides.
///
/// With empty overrides this is [`Sources::hosts`]. Otherwise every host
/// is overridden and de-duplicated again, since overriding changes
/// identities.
pub fn load_hosts(sources: &mut Sources, overrides: &Overrides) -> Vec<Host> {
    let hosts = sources.hosts();
    if overrides.is_empty() {
        hosts
    } else {
        apply_overrides(&hosts, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed {
        name: &'static str,
        priority: i32,
        hosts: Vec<Host>,
    }

    impl Fixed {
        fn new(name: &'static str, priority: i32, hostnames: &[&str]) -> Self {
            let hosts = hostnames
                .iter()
                .map(|h| Host::new(*h, *h).with_source(name))
                .collect();
            Self {
                name,
                priority,
                hosts,
            }
        }
    }

    impl Source for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn hosts(&mut self) -> &[Host] {
            &self.hosts
        }
    }

    #[test]
    fn test_higher_priority_wins() {
        let mut sources = Sources::new()
            .with(Fixed::new("low", 2, &["shared", "b"]))
            .with(Fixed::new("high", 1, &["shared", "a"]));

        let hosts = sources.hosts();
        let summary: Vec<_> = hosts.iter().map(|h| (h.name(), h.source())).collect();
        assert_eq!(
            summary,
            [("shared", "high"), ("a", "high"), ("b", "low")]
        );
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let mut sources = Sources::new()
            .with(Fixed::new("first", 1, &["x"]))
            .with(Fixed::new("second", 1, &["x", "y"]));
        let hosts = sources.hosts();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].source(), "first");
        assert_eq!(sources.names(), ["first", "second"]);
    }

    #[test]
    fn test_empty_sources() {
        let mut sources = Sources::new();
        assert!(sources.names().is_empty());
        assert!(sources.hosts().is_empty());
    }

    #[test]
    fn test_load_hosts_without_overrides() {
        let mut sources = Sources::new().with(Fixed::new("s", 1, &["a", "b"]));
        let hosts = load_hosts(&mut sources, &Overrides::default());
        assert_eq!(hosts.len(), 2);
        assert!(hosts.iter().all(|h| h.overrides().is_empty()));
    }

    #[test]
    fn test_load_hosts_with_overrides() {
        let mut sources = Sources::new().with(Fixed::new("s", 1, &["a"]));
        let hosts = load_hosts(&mut sources, &Overrides::new(Some("root".into()), None));
        assert_eq!(hosts[0].ssh_url(), "ssh://root@a");
    }
}
