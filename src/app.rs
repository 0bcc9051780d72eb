use config::{Config, LoadError};
use hosts::{DemoSource, FileSource, History, Host, Query, Sources, load_hosts};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

// Lower number wins when sources provide the same host.
pub const PRIORITY_USER_CONFIG: i32 = 1;
pub const PRIORITY_KNOWN_HOSTS: i32 = 2;
pub const PRIORITY_HISTORY: i32 = 3;
pub const PRIORITY_GLOBAL_CONFIG: i32 = 4;
pub const PRIORITY_ETC_HOSTS: i32 = 5;

pub const HISTORY_SOURCE: &str = "history";

const GLOBAL_CONFIG_PATH: &str = "/etc/ssh/ssh_config";
const ETC_HOSTS_PATH: &str = "/etc/hosts";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),

    #[error(transparent)]
    Hosts(#[from] hosts::Error),

    #[error("could not determine home or data directory")]
    NoDataDir,

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Locations of every file a source can be built from.
#[derive(Debug, Clone, Default)]
pub struct Paths {
    pub user_config: Option<PathBuf>,
    pub known_hosts: Option<PathBuf>,
    pub global_config: PathBuf,
    pub etc_hosts: PathBuf,
    pub history: Option<PathBuf>,
}

impl Paths {
    /// Standard locations under the home directory and `/etc`.
    pub fn detect(config: &Config) -> Self {
        let ssh_dir = dirs::home_dir().map(|home| home.join(".ssh"));
        Self {
            user_config: ssh_dir.as_ref().map(|dir| dir.join("config")),
            known_hosts: ssh_dir.map(|dir| dir.join("known_hosts")),
            global_config: PathBuf::from(GLOBAL_CONFIG_PATH),
            etc_hosts: PathBuf::from(ETC_HOSTS_PATH),
            history: config::history_path(config),
        }
    }
}

/// Loads `~/.hostdir.json` and applies the environment on top.
///
/// An invalid config file is reported and replaced by the defaults, so a
/// typo never hides all hosts.
pub fn load_config(demo: bool) -> Config {
    let mut config = config::load().unwrap_or_else(|e| {
        warn!("{e}; using default settings");
        Config::default()
    });
    config.apply_process_env();
    config.demo |= demo;
    config
}

/// Builds the enabled sources.
pub fn build_sources(config: &Config, paths: &Paths) -> Sources {
    let mut sources = Sources::new();

    if config.demo {
        info!("**** using demo data ****");
        sources.push(DemoSource::new(0));
        return sources;
    }

    let enabled = config.sources;
    if enabled.history {
        if let Some(path) = &paths.history {
            sources.push(History::new(path, HISTORY_SOURCE, PRIORITY_HISTORY));
        } else {
            warn!("no data directory; history disabled");
        }
    }
    if enabled.etc_hosts {
        sources.push(FileSource::hosts_file(
            &paths.etc_hosts,
            ETC_HOSTS_PATH,
            PRIORITY_ETC_HOSTS,
        ));
    }
    if enabled.known_hosts
        && let Some(path) = &paths.known_hosts
    {
        sources.push(FileSource::known_hosts(path, "known_hosts", PRIORITY_KNOWN_HOSTS));
    }
    if enabled.ssh_config
        && let Some(path) = &paths.user_config
    {
        sources.push(FileSource::ssh_config(path, "~/.ssh/config", PRIORITY_USER_CONFIG));
    }
    if enabled.etc_ssh_config {
        sources.push(FileSource::ssh_config(
            &paths.global_config,
            "/etc/ssh",
            PRIORITY_GLOBAL_CONFIG,
        ));
    }

    debug!("active sources: {:?}", sources.names());
    sources
}

/// Hosts for a query, in source priority order.
///
/// Username and port in the query are forced onto every host; a query
/// that is itself a valid hostname is offered as an extra host.
pub fn search(sources: &mut Sources, query: &Query) -> Vec<Host> {
    let hosts = query.append_input_host(load_hosts(sources, &query.overrides()));
    info!(
        "query={:?} username={:?} port={:?}: {} host(s)",
        query.text(),
        query.username(),
        query.port(),
        hosts.len()
    );
    hosts
}

/// Everything a presentation layer needs to show and open a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub username: Option<String>,
    pub source: String,
    pub uid: String,
    pub ssh_url: String,
    pub sftp_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mosh: Option<String>,
    pub from_history: bool,
}

impl HostRecord {
    pub fn new(host: &Host, config: &Config) -> Self {
        let mosh = config.mosh_cmd.as_deref().map(|path| {
            let cmd = host.mosh_command(path);
            if config.exit_on_success {
                format!("{cmd} && exit")
            } else {
                cmd
            }
        });

        Self {
            name: host.name().to_string(),
            hostname: host.hostname().to_string(),
            port: host.port(),
            username: host.username().map(String::from),
            source: host.source().to_string(),
            uid: host.uid(),
            ssh_url: host.ssh_url(),
            sftp_url: host.sftp_url(),
            mosh,
            from_history: host.source() == HISTORY_SOURCE,
        }
    }
}

/// Opens the history for a remember/forget action, or `None` if history
/// is switched off.
///
/// # Errors
///
/// Returns [`AppError::NoDataDir`] if there is nowhere to keep it.
pub fn history(config: &Config, paths: &Paths) -> Result<Option<History>, AppError> {
    if !config.sources.history {
        info!("history disabled; ignoring");
        return Ok(None);
    }
    let path = paths.history.as_ref().ok_or(AppError::NoDataDir)?;
    Ok(Some(History::new(path, HISTORY_SOURCE, PRIORITY_HISTORY)))
}

/// Adds `url` to the history.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the history cannot be saved.
pub fn remember(config: &Config, paths: &Paths, url: &str) -> Result<(), AppError> {
    if let Some(mut history) = history(config, paths)?
        && history.add_url(url)?
    {
        info!("saved {url} to history");
    }
    Ok(())
}

/// Removes `url` from the history.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the history cannot be saved.
pub fn forget(config: &Config, paths: &Paths, url: &str) -> Result<(), AppError> {
    if let Some(mut history) = history(config, paths)?
        && history.remove_url(url)?
    {
        info!("removed {url} from history");
    }
    Ok(())
}

/// Application to open a URL with, from `SSH_APP`/`SFTP_APP`.
fn handler_for(scheme: &str, var: impl Fn(&str) -> Option<String>) -> Option<String> {
    let key = match scheme {
        "ssh" => "SSH_APP",
        "sftp" => "SFTP_APP",
        _ => return None,
    };
    var(key).filter(|app| !app.is_empty())
}

/// Opens an `ssh://` or `sftp://` URL with the system handler.
///
/// # Errors
///
/// Returns an error if the URL is invalid or no handler could be launched.
pub fn open_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|source| AppError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let result = match handler_for(parsed.scheme(), |key| std::env::var(key).ok()) {
        Some(app) => {
            info!("opening {url} with {app}");
            open::with(url, app)
        }
        None => {
            info!("opening {url}");
            open::that(url)
        }
    };

    result.map_err(|source| AppError::Open {
        url: url.to_string(),
        source,
    })
}
