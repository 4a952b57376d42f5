//! core::repolist
//!
//! The persisted list of repositories a run operates on.
//!
//! # Format
//!
//! ```json
//! {
//!   "RepoList": [
//!     { "path": "/home/me/code/alpha", "name": "alpha" }
//!   ]
//! }
//! ```
//!
//! The list is produced by `yeet refresh`, which runs `repo list -f` in the
//! configured root and parses its `<path> : <name>` lines.
//!
//! # Invariants
//!
//! - Entries are immutable once loaded and shared read-only across tasks
//! - Names are unique; a duplicate name is rejected at load time

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::git::{CommandRunner, Invocation};

/// Program that enumerates repositories under the root.
pub const DISCOVERY_PROGRAM: &str = "repo";

/// Arguments for [`DISCOVERY_PROGRAM`].
pub const DISCOVERY_ARGS: [&str; 2] = ["list", "-f"];

/// Errors from repository list operations.
#[derive(Debug, Error)]
pub enum RepoListError {
    #[error("failed to read repository list '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse repository list '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write repository list '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("`repo list -f` failed in '{dir}': {message}")]
    Discovery { dir: PathBuf, message: String },

    #[error("no repositories found in '{0}'")]
    Empty(PathBuf),

    #[error("repository name '{0}' appears more than once")]
    DuplicateName(String),
}

/// One repository: where it lives and what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Working directory of the repository
    pub path: PathBuf,
    /// Display name
    pub name: String,
}

impl RepoInfo {
    /// Create a repository entry.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// The repository list file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoList {
    #[serde(rename = "RepoList", default)]
    pub repos: Vec<RepoInfo>,
}

impl RepoList {
    /// Create a list from entries, rejecting duplicate names.
    pub fn new(repos: Vec<RepoInfo>) -> Result<Self, RepoListError> {
        let list = Self { repos };
        list.check_unique()?;
        Ok(list)
    }

    /// Load a repository list from disk.
    pub fn load(path: &Path) -> Result<Self, RepoListError> {
        let contents = fs::read_to_string(path).map_err(|e| RepoListError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let list: RepoList =
            serde_json::from_str(&contents).map_err(|e| RepoListError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        list.check_unique()?;
        tracing::debug!(
            path = %path.display(),
            repos = list.len(),
            "loaded repository list",
        );
        Ok(list)
    }

    /// Write the list to disk, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), RepoListError> {
        let write_err = |e| RepoListError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| RepoListError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(path, json).map_err(write_err)
    }

    /// Enumerate repositories under `repo_dir` with `repo list -f`.
    ///
    /// `runner` must launch [`DISCOVERY_PROGRAM`].
    pub async fn discover(
        runner: &dyn CommandRunner,
        repo_dir: &Path,
    ) -> Result<Self, RepoListError> {
        let result = runner
            .run(&Invocation::new(DISCOVERY_ARGS, repo_dir))
            .await;
        if !result.passed {
            return Err(RepoListError::Discovery {
                dir: repo_dir.to_path_buf(),
                message: result.diagnostic(),
            });
        }
        let repos = parse_discovery_output(&result.output);
        if repos.is_empty() {
            return Err(RepoListError::Empty(repo_dir.to_path_buf()));
        }
        Self::new(repos)
    }

    /// Number of repositories.
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// True when the list has no repositories.
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Entries wrapped for sharing across tasks.
    pub fn shared(&self) -> Vec<Arc<RepoInfo>> {
        self.repos.iter().cloned().map(Arc::new).collect()
    }

    fn check_unique(&self) -> Result<(), RepoListError> {
        let mut seen = HashSet::new();
        for repo in &self.repos {
            if !seen.insert(repo.name.as_str()) {
                return Err(RepoListError::DuplicateName(repo.name.clone()));
            }
        }
        Ok(())
    }
}

/// Parse `<path> : <name>` lines. Lines without a separator are skipped.
pub fn parse_discovery_output(lines: &[String]) -> Vec<RepoInfo> {
    lines
        .iter()
        .filter_map(|line| {
            let (path, name) = line.split_once(" : ")?;
            let (path, name) = (path.trim(), name.trim());
            if path.is_empty() || name.is_empty() {
                return None;
            }
            Some(RepoInfo::new(path, name))
        })
        .collect()
}
