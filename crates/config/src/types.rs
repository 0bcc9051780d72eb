use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which host sources are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceToggles {
    pub ssh_config: bool,
    pub etc_ssh_config: bool,
    pub known_hosts: bool,
    pub etc_hosts: bool,
    pub history: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            ssh_config: true,
            etc_ssh_config: true,
            known_hosts: true,
            etc_hosts: true,
            history: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourceToggles,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    pub mosh_cmd: Option<String>,

    pub exit_on_success: bool,

    pub demo: bool,
}

impl Config {
    /// Applies the environment switches on top of the file settings.
    ///
    /// `DISABLE_*` switches only ever turn sources off; `MOSH_CMD` replaces
    /// the configured mosh command.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| var(key).is_some_and(|v| is_truthy(&v));

        let sources = &mut self.sources;
        sources.ssh_config &= !set("DISABLE_CONFIG");
        sources.etc_ssh_config &= !set("DISABLE_ETC_CONFIG");
        sources.known_hosts &= !set("DISABLE_KNOWN_HOSTS");
        sources.etc_hosts &= !set("DISABLE_ETC_HOSTS");
        sources.history &= !set("DISABLE_HISTORY");

        self.demo |= set("DEMO_MODE");
        self.exit_on_success |= set("EXIT_ON_SUCCESS");
        if let Some(cmd) = var("MOSH_CMD").filter(|c| !c.is_empty()) {
            self.mosh_cmd = Some(cmd);
        }
    }

    /// [`Config::apply_env`] with the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }
}

/// `1`, `y` and `yes` (any case) switch an option on.
fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "y" | "yes")
}
