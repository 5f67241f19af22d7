//! Configuration file loading for the analysis server.
//!
//! Settings come from `analysis.toml`. Every field has a default, so a
//! missing file or a partial one is fine. Relative paths in a loaded file
//! are resolved against the file's directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_analysis::EngineConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default config file name.
pub const CONFIG_FILE: &str = "analysis.toml";

/// Directories searched for [`CONFIG_FILE`], in order.
const SEARCH_DIRS: [&str; 3] = [".", "..", "../.."];

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The settings parsed but contradict each other.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// HTTP listener and request handling settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for one analysis request.
    pub request_timeout_ms: u64,
    /// Largest accepted `timeToAnalyze`; must be below `request_timeout_ms`.
    pub max_time_to_analyze_ms: u64,
    /// Requests slower than this are logged as warnings.
    pub slow_request_ms: u64,
    /// File served at `/robots.txt`.
    pub robots_path: PathBuf,
    /// Engine license served at `/about`.
    pub license_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_ms: 30_000,
            max_time_to_analyze_ms: 10_000,
            slow_request_ms: 100,
            robots_path: PathBuf::from("static/robots.txt"),
            license_path: PathBuf::from("/usr/share/doc/stockfish/COPYING"),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn slow_request(&self) -> Duration {
        Duration::from_millis(self.slow_request_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Loads the configuration.
    ///
    /// With an explicit `path` the file must exist. Otherwise the search
    /// directories are tried in order and defaults are used when no file is
    /// found. Returns the config together with the file it came from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// or [`ConfigError::ParseError`] if it contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find(),
        };
        match path {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Reads and parses one file, resolving its relative paths against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that depend on each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_time_to_analyze_ms >= self.server.request_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "max_time_to_analyze_ms ({}) must be below request_timeout_ms ({})",
                self.server.max_time_to_analyze_ms, self.server.request_timeout_ms
            )));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.server.robots_path, &mut self.server.license_path] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Returns the first existing config file in the search directories.
    pub fn find() -> Option<PathBuf> {
        SEARCH_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }
}
