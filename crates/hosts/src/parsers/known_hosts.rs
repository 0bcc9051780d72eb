//! Parser for `known_hosts` files.
//!
//! Each line is `host[,host...] key-type key-data`. Hosts on a non-default
//! port use the bracketed `[host]:port` form.

use crate::error::ParseError;
use crate::host::{DEFAULT_PORT, Host, is_valid_hostname};
use tracing::{debug, warn};

/// Parses a whole `known_hosts` file.
pub fn parse(content: &str, label: &str) -> Vec<Host> {
    content
        .lines()
        .flat_map(|line| parse_line(line, label))
        .collect()
}

/// Extracts the host(s) from a single `known_hosts` line.
///
/// The key material after the first whitespace is discarded. Lines without
/// whitespace yield nothing.
pub fn parse_line(line: &str, label: &str) -> Vec<Host> {
    if line.starts_with('#') || line.starts_with('@') {
        return Vec::new();
    }

    let Some((field, _key)) = line.split_once(char::is_whitespace) else {
        return Vec::new();
    };

    if field.starts_with("|1|") {
        debug!(file = label, "skipping hashed entry");
        return Vec::new();
    }

    field
        .split(',')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match parse_entry(entry) {
            Ok(host) => Some(host),
            Err(err) => {
                warn!(file = label, "{err}");
                None
            }
        })
        .collect()
}

fn parse_entry(entry: &str) -> Result<Host, ParseError> {
    let (hostname, port) = if let Some(rest) = entry.strip_prefix('[') {
        let (hostname, port) = rest
            .split_once("]:")
            .ok_or_else(|| ParseError::MalformedBracket(entry.to_string()))?;
        let port = port.parse::<u16>().map_err(|_| ParseError::InvalidPort {
            entry: entry.to_string(),
            port: port.to_string(),
        })?;
        (hostname, port)
    } else {
        (entry, DEFAULT_PORT)
    };

    if !is_valid_hostname(hostname) {
        return Err(ParseError::InvalidHostname(hostname.to_string()));
    }

    Ok(Host::new(hostname, hostname).with_port(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hostnames(line: &str) -> Vec<(String, u16)> {
        parse_line(line, "test")
            .iter()
            .map(|h| (h.hostname().to_string(), h.port()))
            .collect()
    }

    #[test]
    fn test_empty_and_invalid_lines() {
        assert!(hostnames("").is_empty());
        assert!(hostnames("nowhitespace").is_empty());
    }

    #[test]
    fn test_simple_hostnames() {
        for name in ["localhost", "github.com", "gist.github.com", "127.0.0.1"] {
            let line = format!("{name} ssh-rsa AAAA");
            assert_eq!(hostnames(&line), vec![(name.to_string(), 22)]);
        }
    }

    #[test]
    fn test_bracketed_port() {
        assert_eq!(
            hostnames("[8.8.8.8]:1234 ssh-rsa AAAA"),
            vec![("8.8.8.8".to_string(), 1234)]
        );
        assert_eq!(
            hostnames("[printer.example.com]:1234 ssh-rsa AAAA"),
            vec![("printer.example.com".to_string(), 1234)]
        );
    }

    #[test]
    fn test_comma_separated() {
        assert_eq!(
            hostnames("machine.example.com,10.0.0.1 ecdsa-sha2-nistp256 AAAA"),
            vec![
                ("machine.example.com".to_string(), 22),
                ("10.0.0.1".to_string(), 22),
            ]
        );
        assert_eq!(
            hostnames("::1,127.0.0.1,localhost ecdsa-sha2-nistp256 AAAA"),
            vec![
                ("::1".to_string(), 22),
                ("127.0.0.1".to_string(), 22),
                ("localhost".to_string(), 22),
            ]
        );
    }

    #[test]
    fn test_bad_entry_does_not_abort_line() {
        assert_eq!(
            hostnames("[broken,[bad]:port,good.example.com,bad_name ssh-rsa AAAA"),
            vec![("good.example.com".to_string(), 22)]
        );
    }

    #[test]
    fn test_name_equals_hostname() {
        let hosts = parse_line("[host.example.com]:2222 ssh-ed25519 AAAA", "test");
        assert_eq!(hosts[0].name(), "host.example.com");
        assert_eq!(hosts[0].ssh_url(), "ssh://host.example.com:2222");
    }

    #[test]
    fn test_skips_comments_markers_and_hashes() {
        let content = "# comment\n\
                       @cert-authority *.example.com ssh-rsa AAAA\n\
                       |1|abc123|def456 ssh-rsa AAAA\n\
                       real.host\tssh-rsa AAAA\n";
        let hosts = parse(content, "test");
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].hostname(), "real.host");
    }

    #[test]
    fn test_parse_entry_errors() {
        assert_eq!(
            parse_entry("[host"),
            Err(ParseError::MalformedBracket("[host".into()))
        );
        assert!(matches!(
            parse_entry("[host]:99999"),
            Err(ParseError::InvalidPort { .. })
        ));
        assert_eq!(
            parse_entry("host:22"),
            Err(ParseError::InvalidHostname("host:22".into()))
        );
    }
}
