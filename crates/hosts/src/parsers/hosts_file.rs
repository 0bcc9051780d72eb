//! Parser for `/etc/hosts`-style files.

use crate::error::ParseError;
use crate::host::Host;
use std::net::IpAddr;
use tracing::warn;

/// Alias that never names a connectable host.
const BROADCAST_HOST: &str = "broadcasthost";

/// Parses `ip alias [alias...]` lines; `#` starts a comment.
///
/// Every alias yields a host on the default port.
pub fn parse(content: &str, label: &str) -> Vec<Host> {
    let mut hosts = Vec::new();

    for line in content.lines() {
        let line = line.split_once('#').map_or(line, |(data, _)| data).trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(address) = fields.next() else {
            continue;
        };
        if address.parse::<IpAddr>().is_err() {
            warn!(file = label, "{}", ParseError::InvalidAddress(address.to_string()));
            continue;
        }

        hosts.extend(
            fields
                .filter(|alias| *alias != BROADCAST_HOST)
                .map(|alias| Host::new(alias, alias)),
        );
    }

    hosts
}
