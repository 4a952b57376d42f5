//! core::paths
//!
//! Centralized path routing for yeet's files.
//!
//! # Files
//!
//! - `config.toml` - master branch, designated remote, repository root
//! - `repolist.json` - the repository list written by `yeet refresh`
//!
//! Both live in one directory. The repository list sits next to whichever
//! config file was loaded unless `--repolist` or `$YEET_REPOLIST` says
//! otherwise, so a config picked via `$YEET_CONFIG` carries its list along.
//!
//! # Example
//!
//! ```
//! use yeet::core::paths::{config_candidates, ConfigEnv};
//! use std::path::PathBuf;
//!
//! let env = ConfigEnv {
//!     home: Some(PathBuf::from("/home/me")),
//!     ..Default::default()
//! };
//! assert_eq!(
//!     config_candidates(&env),
//!     vec![PathBuf::from("/home/me/.yeet/config.toml")]
//! );
//! ```

use std::path::{Path, PathBuf};

/// Config location relative to the home directory.
pub const CANONICAL_CONFIG: &str = ".yeet/config.toml";

/// File name of the persisted repository list.
pub const REPOLIST_FILENAME: &str = "repolist.json";

/// Snapshot of the environment values that influence path lookup.
///
/// Captured once so lookups are deterministic and testable without
/// mutating the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    /// `$YEET_CONFIG`
    pub yeet_config: Option<PathBuf>,
    /// `$YEET_REPOLIST`
    pub yeet_repolist: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`
    pub xdg_config_home: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
}

impl ConfigEnv {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            yeet_config: var("YEET_CONFIG"),
            yeet_repolist: var("YEET_REPOLIST"),
            xdg_config_home: var("XDG_CONFIG_HOME"),
            home: dirs::home_dir(),
        }
    }
}

/// Config file locations in lookup order.
pub fn config_candidates(env: &ConfigEnv) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = &env.yeet_config {
        candidates.push(path.clone());
    }
    if let Some(xdg) = &env.xdg_config_home {
        candidates.push(xdg.join("yeet/config.toml"));
    }
    if let Some(home) = &env.home {
        candidates.push(home.join(CANONICAL_CONFIG));
    }
    candidates
}

/// Resolve where the repository list lives.
///
/// Precedence: explicit flag, `$YEET_REPOLIST`, then `repolist.json` in the
/// directory of the loaded config file.
pub fn repolist_path(explicit: Option<&Path>, env: &ConfigEnv, config_path: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = &env.yeet_repolist {
        return path.clone();
    }
    config_path
        .parent()
        .map(|dir| dir.join(REPOLIST_FILENAME))
        .unwrap_or_else(|| PathBuf::from(REPOLIST_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_in_order() {
        let env = ConfigEnv {
            yeet_config: Some(PathBuf::from("/etc/yeet.toml")),
            yeet_repolist: None,
            xdg_config_home: Some(PathBuf::from("/xdg")),
            home: Some(PathBuf::from("/home/me")),
        };
        assert_eq!(
            config_candidates(&env),
            vec![
                PathBuf::from("/etc/yeet.toml"),
                PathBuf::from("/xdg/yeet/config.toml"),
                PathBuf::from("/home/me/.yeet/config.toml"),
            ]
        );
    }

    #[test]
    fn no_environment_means_no_candidates() {
        assert!(config_candidates(&ConfigEnv::default()).is_empty());
    }

    #[test]
    fn repolist_precedence() {
        let config = Path::new("/home/me/.yeet/config.toml");
        let env = ConfigEnv {
            yeet_repolist: Some(PathBuf::from("/tmp/env.json")),
            ..Default::default()
        };

        assert_eq!(
            repolist_path(Some(Path::new("/tmp/flag.json")), &env, config),
            PathBuf::from("/tmp/flag.json")
        );
        assert_eq!(
            repolist_path(None, &env, config),
            PathBuf::from("/tmp/env.json")
        );
        assert_eq!(
            repolist_path(None, &ConfigEnv::default(), config),
            PathBuf::from("/home/me/.yeet/repolist.json")
        );
    }
}
