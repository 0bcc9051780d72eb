//! Parser for `ssh_config` files.
//!
//! Only `Host` blocks are enumerated. Each literal alias on a `Host` line
//! becomes one host carrying the block's `HostName`, `Port` and `User`.

use crate::error::ParseError;
use crate::host::{DEFAULT_PORT, Host};
use tracing::warn;

/// Directives collected for one `Host` block.
#[derive(Debug, Default)]
struct Block {
    aliases: Vec<String>,
    hostname: Option<String>,
    port: Option<u16>,
    user: Option<String>,
}

impl Block {
    fn flush(self, hosts: &mut Vec<Host>) {
        let port = self.port.unwrap_or(DEFAULT_PORT);
        let user = self.user.unwrap_or_default();
        for alias in self.aliases {
            let hostname = self.hostname.clone().unwrap_or_else(|| alias.clone());
            hosts.push(
                Host::config(alias, hostname)
                    .with_port(port)
                    .with_username(user.as_str()),
            );
        }
    }
}

/// Parses ssh config content and returns one host per literal alias.
///
/// Wildcard (`*`, `?`) and negated (`!`) patterns are skipped. Like `ssh`,
/// the first value of a directive within a block wins.
pub fn parse(content: &str, label: &str) -> Vec<Host> {
    let mut hosts = Vec::new();
    let mut block = Block::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = split_directive(line) else {
            continue;
        };

        match key.to_lowercase().as_str() {
            "host" => {
                std::mem::take(&mut block).flush(&mut hosts);
                block.aliases = value
                    .split_whitespace()
                    .map(unquote)
                    .filter(|a| is_literal(a))
                    .map(String::from)
                    .collect();
            }
            // Match blocks are not enumerable.
            "match" => std::mem::take(&mut block).flush(&mut hosts),
            "hostname" if block.hostname.is_none() => {
                block.hostname = Some(unquote(value).to_string());
            }
            "user" if block.user.is_none() => block.user = Some(unquote(value).to_string()),
            "port" if block.port.is_none() => {
                let port = unquote(value);
                block.port = Some(match port.parse::<u16>() {
                    Ok(p) if p != 0 => p,
                    _ => {
                        let err = ParseError::InvalidPort {
                            entry: block.aliases.join(" "),
                            port: port.to_string(),
                        };
                        warn!(file = label, "{err}");
                        DEFAULT_PORT
                    }
                });
            }
            _ => {}
        }
    }

    block.flush(&mut hosts);
    hosts
}

/// Splits `Key value` or `Key=value`.
fn split_directive(line: &str) -> Option<(&str, &str)> {
    let end = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let (key, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let value = rest.strip_prefix('=').unwrap_or(rest).trim();
    (!value.is_empty()).then_some((key, value))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn is_literal(pattern: &str) -> bool {
    !pattern.is_empty() && !pattern.contains(['*', '?', '!'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostKind;

    #[test]
    fn test_parse_basic_host() {
        let config = r"
Host myserver
    HostName 192.168.1.100
    User deploy
    Port 2222
";
        let hosts = parse(config, "test");
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].name(), "myserver");
        assert_eq!(hosts[0].hostname(), "192.168.1.100");
        assert_eq!(hosts[0].username(), Some("deploy"));
        assert_eq!(hosts[0].port(), 2222);
        assert_eq!(hosts[0].kind(), HostKind::Config);
    }

    #[test]
    fn test_hostname_defaults_to_alias() {
        let hosts = parse("Host db.example.com\n  User postgres\n", "test");
        assert_eq!(hosts[0].hostname(), "db.example.com");
        assert_eq!(hosts[0].port(), 22);
    }

    #[test]
    fn test_skip_wildcard_and_negated() {
        let config = r"
Host *
    ServerAliveInterval 60

Host *.example.com web? !bastion
    User admin

Host myserver other
    HostName 10.0.0.1
";
        let names: Vec<_> = parse(config, "test")
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, ["myserver", "other"]);
    }

    #[test]
    fn test_multi_alias_shares_settings() {
        let config = "Host foo bar\n    HostName shared.example.com\n    User shared\n";
        let hosts = parse(config, "test");
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].name(), "foo");
        assert_eq!(hosts[1].name(), "bar");
        assert_eq!(hosts[0].hostname(), hosts[1].hostname());
        assert_eq!(hosts[1].username(), Some("shared"));
    }

    #[test]
    fn test_invalid_port_resets_to_default() {
        let hosts = parse("Host a\n  Port ssh\nHost b\n  Port 70000\n", "test");
        assert_eq!(hosts[0].port(), 22);
        assert_eq!(hosts[1].port(), 22);
    }

    #[test]
    fn test_equals_syntax_and_case() {
        let config = "host eqhost\n    HOSTNAME=eq.example.com\n    user = equser\n    Port=3022\n";
        let hosts = parse(config, "test");
        assert_eq!(hosts[0].hostname(), "eq.example.com");
        assert_eq!(hosts[0].username(), Some("equser"));
        assert_eq!(hosts[0].port(), 3022);
    }

    #[test]
    fn test_first_value_wins() {
        let hosts = parse("Host a\n  HostName one\n  HostName two\n", "test");
        assert_eq!(hosts[0].hostname(), "one");
    }

    #[test]
    fn test_match_ends_block() {
        let config = "Host a\n  User alice\nMatch host b\n  User bob\n  HostName nope\n";
        let hosts = parse(config, "test");
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].username(), Some("alice"));
        assert_eq!(hosts[0].hostname(), "a");
    }

    #[test]
    fn test_directives_before_first_host_ignored() {
        let hosts = parse("User global\nHostName x\nHost a\n", "test");
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].username(), None);
        assert_eq!(hosts[0].hostname(), "a");
    }

    #[test]
    fn test_comments_and_empty() {
        assert!(parse("", "test").is_empty());
        let content = "# comment
Host server1
    # HostName commented.out
    HostName real.example.com
";
        let hosts = parse(content, "test");
        assert_eq!(hosts[0].hostname(), "real.example.com");
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(split_directive("Port 22"), Some(("Port", "22")));
        assert_eq!(split_directive("Port=22"), Some(("Port", "22")));
        assert_eq!(split_directive("Port = 22"), Some(("Port", "22")));
        assert_eq!(split_directive("Port"), None);
    }
}
