use crate::schema::{ConfigError, ValidationResult, validate};
use crate::types::Config;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

const DEFAULT_JSON: &str = include_str!("../../../assets/hostdir.default.json");

/// Directory name under the platform data dir.
const APP_DIR: &str = "hostdir";

/// Error type for config loading operations.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Returns the default config file path (~/.hostdir.json).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hostdir.json"))
}

/// Returns the directory holding the history file.
///
/// Falls back to the home directory on platforms without a data dir.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .or_else(|| dirs::home_dir().map(|home| home.join(format!(".{APP_DIR}"))))
}

/// Returns the history file path: the configured one, or the default
/// one in [`data_dir`]. Demo mode keeps its own history.
pub fn history_path(config: &Config) -> Option<PathBuf> {
    if let Some(path) = &config.history_file
        && !config.demo
    {
        return Some(path.clone());
    }
    let file = if config.demo {
        "history.test.json"
    } else {
        "history.json"
    };
    data_dir().map(|dir| dir.join(file))
}

/// Ensures the config file exists, creating a default one if missing.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or if
/// writing the default config file fails.
pub fn ensure_config_exists() -> Result<PathBuf, LoadError> {
    let path = config_path().ok_or(LoadError::NoHomeDir)?;

    if !path.exists() {
        fs::write(&path, DEFAULT_JSON)?;
        info!("created default config at {}", path.display());
    }

    Ok(path)
}

/// Loads config from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or fails schema validation.
pub fn load_from_str(s: &str) -> Result<Config, ConfigError> {
    s.parse()
}

/// Loads config from a specific path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the config is invalid.
pub fn load_from_path(path: &Path) -> Result<Config, LoadError> {
    let contents = fs::read_to_string(path)?;
    Ok(load_from_str(&contents)?)
}

/// Loads config from the default path (~/.hostdir.json).
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the config is invalid.
pub fn load() -> Result<Config, LoadError> {
    let path = config_path().ok_or(LoadError::NoHomeDir)?;

    if !path.exists() {
        return Ok(Config::default());
    }

    load_from_path(&path)
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;

        if let ValidationResult::Invalid(errors) = validate(&value) {
            return Err(ConfigError::ValidationFailed(errors));
        }

        Ok(serde_json::from_value(value)?)
    }
}
