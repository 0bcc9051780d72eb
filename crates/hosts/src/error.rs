use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Parse Diagnostics
// ============================================================================

/// A problem with a single line or hostname inside an otherwise readable file.
///
/// These never abort a parse: the offending entry is skipped and the
/// diagnostic is logged with the file label attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `[host]:port` entry without the closing `]:`.
    #[error("don't understand hostname: {0}")]
    MalformedBracket(String),

    /// Port that is not a number in `1..=65535`.
    #[error("invalid port `{port}` for {entry}")]
    InvalidPort { entry: String, port: String },

    /// Hosts-file line whose first field is not an IP address.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Syntactically fine but not a usable hostname.
    #[error("invalid hostname: {0}")]
    InvalidHostname(String),
}

// ============================================================================
// Crate Error
// ============================================================================

/// Error type for operations whose failure must reach the caller.
///
/// Reading sources is fail-open and never produces one of these; only
/// explicit history mutations and URL conversions do.
#[derive(Error, Debug)]
pub enum Error {
    /// History file could not be read or written.
    #[error("history file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// History file exists but is not a JSON array of strings.
    #[error("history file {} is corrupt: {source}", path.display())]
    HistoryFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// String is not an absolute `scheme://[user@]host[:port]` URL.
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl Error {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
