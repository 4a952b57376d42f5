//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! master_branch = "main"
//! remote = "upstream"
//! repo_dir = "/home/me/code"
//!
//! [dispatch]
//! timeout_secs = 300
//! jobs = 8
//! ```
//!
//! # Validation
//!
//! Every field is optional at parse time so that a missing value can be
//! reported by name instead of as a generic TOML error. [`ConfigFile::validate`]
//! turns the raw file into a [`Config`] with typed, non-empty values.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{BranchName, RemoteName};

/// Raw configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Long-lived integration branch every repository falls back to
    pub master_branch: Option<String>,

    /// Remote to prefer when a repository has more than one
    pub remote: Option<String>,

    /// Root directory that holds the repositories
    pub repo_dir: Option<PathBuf>,

    /// Concurrency and deadline settings
    pub dispatch: Option<DispatchConfig>,
}

impl ConfigFile {
    /// Validate the raw file and produce a usable [`Config`].
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingValue` when a required key is absent or empty
    /// - `ConfigError::InvalidValue` when a value is malformed
    pub fn validate(self) -> Result<Config, ConfigError> {
        let master = require("master_branch", self.master_branch)?;
        let master_branch = BranchName::new(master).map_err(|e| {
            ConfigError::InvalidValue(format!("invalid master_branch: {}", e))
        })?;

        let remote = require("remote", self.remote)?;
        let remote = RemoteName::new(remote)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid remote: {}", e)))?;

        let repo_dir = self
            .repo_dir
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingValue("repo_dir"))?;

        let dispatch = self.dispatch.unwrap_or_default();
        dispatch.validate()?;

        Ok(Config {
            master_branch,
            remote,
            repo_dir,
            dispatch,
        })
    }
}

fn require(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingValue(key))
}

/// Dispatch settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Per-repository deadline in seconds
    pub timeout_secs: Option<u64>,

    /// Maximum number of repositories worked on at once
    pub jobs: Option<usize>,
}

impl DispatchConfig {
    /// Validate the dispatch settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "dispatch.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "dispatch.jobs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The per-repository deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Validated configuration threaded through the dispatcher and workflows.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Branch every repository falls back to
    pub master_branch: BranchName,

    /// Designated remote
    pub remote: RemoteName,

    /// Root directory that holds the repositories
    pub repo_dir: PathBuf,

    /// Concurrency and deadline settings
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Build a configuration without dispatch limits.
    pub fn new(
        master_branch: BranchName,
        remote: RemoteName,
        repo_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            master_branch,
            remote,
            repo_dir: repo_dir.into(),
            dispatch: DispatchConfig::default(),
        }
    }
}
