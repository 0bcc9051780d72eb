mod loader;
mod schema;
mod types;

pub use loader::{
    LoadError, config_path, data_dir, ensure_config_exists, history_path, load, load_from_path,
    load_from_str,
};
pub use schema::{ConfigError, ValidationError, ValidationResult, validate};
pub use types::{Config, SourceToggles};
