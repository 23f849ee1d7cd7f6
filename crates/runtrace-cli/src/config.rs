use crate::args::LogLevel;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "RUNTRACE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Resolve the config file path based on priority:
/// 1. Explicit `--config` path
/// 2. RUNTRACE_CONFIG environment variable
/// 3. `<config dir>/runtrace/config.toml`
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    resolve_path_with(explicit, std::env::var_os(CONFIG_ENV))
}

fn resolve_path_with(explicit: Option<&Path>, env_path: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|dir| dir.join("runtrace").join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Flush stdout after every canonical event
    pub flush_each_event: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            flush_each_event: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub pretty: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: Option<LogLevel>,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load the resolved config file; defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}
