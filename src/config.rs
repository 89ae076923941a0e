//! Configuration file and directory resolution.
//!
//! | Purpose | Linux default | Override |
//! |---------|---------------|----------|
//! | Data (board file, logs) | `~/.local/share/taskers/` | `TASKERS_DATA_DIR` |
//! | Config (`config.toml`) | `~/.config/taskers/` | `TASKERS_CONFIG_DIR` |

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::STORAGE_KEY;

#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TASKERS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("taskers"))
        .unwrap_or_else(|| PathBuf::from(".taskers"))
}

#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TASKERS_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("taskers"))
        .unwrap_or_else(|| PathBuf::from(".taskers"))
}

#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

#[must_use]
pub fn default_config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Board file location; defaults to `<data_dir>/<STORAGE_KEY>.json`.
    #[serde(default)]
    pub board_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "taskers=info".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show task descriptions on cards.
    #[serde(default = "default_true")]
    pub show_descriptions: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_descriptions: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Reads `path`. A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn board_file(&self) -> PathBuf {
        self.storage
            .board_file
            .clone()
            .unwrap_or_else(|| data_dir().join(format!("{STORAGE_KEY}.json")))
    }
}
