//! Configuration file support
//!
//! Read from `--config <path>` or `<config dir>/prland/config.toml`. Every
//! field is optional; a missing default file means defaults throughout.

use crate::error::{Error, Result};
use crate::status::{DEFAULT_PER_PAGE, WaitConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the user config dir
const CONFIG_DIR: &str = "prland";

/// Config filename
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// GitHub connection settings
    pub github: GitHubSection,
    /// Status polling settings
    pub wait: WaitSection,
    /// Where workspaces are allocated (default: current directory)
    pub work_dir: Option<PathBuf>,
}

/// `[github]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    /// GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
}

/// `[wait]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitSection {
    /// Seconds between status polls
    pub poll_interval_secs: u64,
    /// Seconds before a status wait times out
    pub timeout_secs: u64,
    /// Statuses fetched per poll
    pub per_page: u8,
}

impl Default for WaitSection {
    fn default() -> Self {
        let defaults = WaitConfig::default();
        Self {
            poll_interval_secs: defaults.poll_interval.as_secs(),
            timeout_secs: defaults.timeout.as_secs(),
            per_page: defaults.per_page,
        }
    }
}

impl WaitSection {
    /// Convert to polling parameters
    pub fn to_wait_config(&self) -> Result<WaitConfig> {
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "wait.poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "wait.timeout_secs must be at least 1".to_string(),
            ));
        }
        let per_page = match self.per_page {
            0 => DEFAULT_PER_PAGE,
            n => n.min(100),
        };

        Ok(WaitConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            per_page,
        })
    }
}

/// Path of the default config file, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load config from `path`
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Load config from `explicit`, or the default location
///
/// An explicit path must exist. A missing default file yields
/// [`Config::default`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Ok(Config::default()),
    }
}
