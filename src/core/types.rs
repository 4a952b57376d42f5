//! core::types
//!
//! Strong types for user-supplied names.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name (target and master branches)
//! - [`RemoteName`] - Non-empty Git remote name
//!
//! # Validation
//!
//! Names typed on the command line or read from configuration are checked
//! once, before any repository is touched. A bad target name therefore fails
//! the whole run up front instead of producing one FAILED line per repository.
//!
//! # Examples
//!
//! ```
//! use yeet::core::types::{BranchName, RemoteName};
//!
//! let branch = BranchName::new("release/9").unwrap();
//! assert_eq!(branch.as_str(), "release/9");
//!
//! assert!(BranchName::new("bad..name").is_err());
//! assert!(RemoteName::new("").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid remote name: {0}")]
    InvalidRemoteName(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// `@{` is the important one here: the upstream lookup appends `@{upstream}`
/// to the branch name, so a name containing it would change the query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |why: &str| Err(TypeError::InvalidBranchName(format!("'{name}' {why}")));

        if name.is_empty() {
            return reject("is empty");
        }
        if name == "@" {
            return reject("is reserved");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return reject("cannot start with '.' or '-'");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return reject("cannot end with '.lock' or '/'");
        }
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return reject(&format!("cannot contain '{bad}'"));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_CHARS.contains(c) || c.is_ascii_control())
        {
            return reject(&format!("cannot contain {c:?}"));
        }

        for component in name.split('/') {
            if component.starts_with('.') || component.ends_with(".lock") {
                return reject("has a path component starting with '.' or ending with '.lock'");
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Git remote name.
///
/// Remote names are only checked for emptiness and whitespace; anything
/// stricter is left to `git remote` itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName(String);

impl RemoteName {
    /// Create a new remote name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidRemoteName("remote cannot be empty".into()));
        }
        if name.chars().any(char::is_whitespace) || name.contains('/') {
            return Err(TypeError::InvalidRemoteName(format!(
                "'{name}' cannot contain whitespace or '/'"
            )));
        }
        Ok(Self(name))
    }

    /// Get the remote name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteName> for String {
    fn from(value: RemoteName) -> Self {
        value.0
    }
}

impl fmt::Display for RemoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_common_names() {
            for name in ["main", "feature-x", "release/9", "user@feature", "v1.2"] {
                assert!(BranchName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn rejects_invalid_names() {
            for name in [
                "",
                "@",
                ".hidden",
                "-flag",
                "branch.lock",
                "trailing/",
                "a..b",
                "main@{upstream}",
                "a//b",
                "has space",
                "tilde~1",
                "caret^",
                "colon:",
                "glob*",
                "feature/.hidden",
                "feature/x.lock/y",
            ] {
                assert!(BranchName::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn serde_validates() {
            let ok: Result<BranchName, _> = serde_json::from_str("\"main\"");
            assert!(ok.is_ok());
            let bad: Result<BranchName, _> = serde_json::from_str("\"a..b\"");
            assert!(bad.is_err());
        }
    }

    mod remote_name {
        use super::*;

        #[test]
        fn accepts_plain_names() {
            assert_eq!(RemoteName::new("origin").unwrap().as_str(), "origin");
        }

        #[test]
        fn rejects_empty_and_spaced() {
            assert!(RemoteName::new("").is_err());
            assert!(RemoteName::new("my remote").is_err());
            assert!(RemoteName::new("a/b").is_err());
        }
    }
}
