//! Fictional hosts for screenshots and testing.

use crate::host::Host;
use crate::source::Source;

/// Source label of demo hosts.
pub const DEMO_SOURCE: &str = "test data";

const DEMO_HOSTNAMES: &[&str] = &[
    "api.dehmel.de",
    "api.gleichner.info",
    "api.hartung.de",
    "api.hayes-padberg.com",
    "api.littel-zieme.com",
    "api.rohleder.org",
    "api.senger-marquardt.com",
    "api.tintzmann.com",
    "imap.hartung.de",
    "imap.roberts-collins.org",
    "imap.roehrdanz.de",
    "imap.senger-beier.com",
    "imap.weitzel.org",
    "mail.dehmel.de",
    "mail.hayes-padberg.com",
    "mail.holzapfel.de",
    "mail.schmitt.info",
    "mail.ziemann.info",
    "smtp.considine-johnston.com",
    "smtp.gleichner.info",
    "smtp.littel-zieme.com",
    "smtp.vogt.de",
    "www.carsten.org",
    "www.roehrdanz.de",
    "www.senger-beier.com",
    "www.weitzel.org",
];

/// Serves a fixed list of fictional hosts instead of real data.
#[derive(Debug)]
pub struct DemoSource {
    priority: i32,
    hosts: Vec<Host>,
}

impl DemoSource {
    pub fn new(priority: i32) -> Self {
        let hosts = DEMO_HOSTNAMES
            .iter()
            .map(|name| Host::new(*name, *name).with_source(DEMO_SOURCE))
            .collect();
        Self { priority, hosts }
    }
}

impl Source for DemoSource {
    fn name(&self) -> &str {
        DEMO_SOURCE
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn hosts(&mut self) -> &[Host] {
        &self.hosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::is_valid_hostname;

    #[test]
    fn test_demo_hosts() {
        let mut source = DemoSource::new(0);
        let hosts = source.hosts();
        assert_eq!(hosts.len(), DEMO_HOSTNAMES.len());
        for host in hosts {
            assert!(is_valid_hostname(host.hostname()));
            assert_eq!(host.source(), DEMO_SOURCE);
            assert_eq!(host.port(), 22);
        }
    }
}
