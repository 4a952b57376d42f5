//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. An explicit path (the `--config` flag)
//! 2. `$YEET_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/yeet/config.toml`
//! 4. `~/.yeet/config.toml` (canonical location)
//!
//! Unlike most settings files, a missing config is an error: the master
//! branch, designated remote and repository root have no sensible defaults.
//!
//! # Example
//!
//! ```no_run
//! use yeet::core::config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! println!("master branch: {}", loaded.config.master_branch);
//! println!("loaded from: {}", loaded.path.display());
//! ```

pub mod schema;

pub use schema::{Config, ConfigFile, DispatchConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::paths::{self, ConfigEnv};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("no config file found (searched: {})", format_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("config is missing a value for '{0}'")]
    MissingValue(&'static str),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated configuration plus the file it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// The file that was read.
    pub path: PathBuf,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// `explicit` takes precedence over every other location and must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if no config file exists, if it cannot be parsed,
    /// or if a required value is missing.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with_env(explicit, &ConfigEnv::from_process())
    }

    /// Load configuration using the given environment snapshot.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: &ConfigEnv,
    ) -> Result<ConfigLoadResult, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::read(path)?;
            return Ok(ConfigLoadResult {
                config,
                path: path.to_path_buf(),
            });
        }

        let candidates = paths::config_candidates(env);
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                let config = Self::read(path)?;
                Ok(ConfigLoadResult {
                    config,
                    path: path.clone(),
                })
            }
            None => Err(ConfigError::NotFound {
                searched: candidates,
            }),
        }
    }

    /// Read, parse and validate a single config file.
    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        file.validate()
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.yeet/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(paths::CANONICAL_CONFIG))
    }
}
