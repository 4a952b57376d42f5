//! git::handle
//!
//! Per-repository git session.
//!
//! # Design
//!
//! A [`RepoHandle`] is opened once per workflow run. Opening asks git for the
//! current branch and the configured remotes; after that the handle only
//! changes its own view of the current branch when one of its checkout
//! operations succeeds. Nothing is re-queried behind the caller's back.
//!
//! Every operation goes through the [`CommandRunner`] and interprets its
//! [`CommandResult`] into a typed outcome or a [`GitError`]. No operation
//! panics or exits the process; the workflow decides what an error means.
//!
//! # Rebase outcomes
//!
//! `git rebase` exiting with code 1 means the replay stopped on a conflict.
//! The handle immediately runs `git rebase --abort` and reports
//! [`RebaseOutcome::Conflict`]. Any other failure, including a failed
//! abort, is a [`GitError`], because the repository may be left mid-rebase.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::command::{CommandResult, CommandRunner, Invocation};
use crate::core::repolist::RepoInfo;

/// Placeholder shown instead of a branch name when HEAD is detached.
pub const DETACHED_HEAD: &str = "DETACHED_HEAD";

/// Exit code git uses when a rebase stops on conflicts.
pub const REBASE_CONFLICT_EXIT: i32 = 1;

/// Errors from repository operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitError {
    /// git could not be started.
    #[error("could not run `git {command}`: {message}")]
    Launch {
        /// The arguments that were attempted
        command: String,
        /// Why the launch failed
        message: String,
    },

    /// git ran and exited non-zero.
    #[error("`git {command}` exited with code {code}: {output}")]
    CommandFailed {
        /// The arguments that failed
        command: String,
        /// The process exit code
        code: i32,
        /// Captured diagnostic output
        output: String,
    },

    /// git succeeded but printed something other than one line.
    #[error("`git {command}` printed {lines} lines, expected exactly one")]
    UnexpectedOutput {
        /// The arguments that ran
        command: String,
        /// How many lines were printed
        lines: usize,
    },

    /// The branch has no upstream configured.
    ///
    /// This is an expected condition; callers decide whether it matters.
    #[error("no upstream configured for {branch}")]
    NoUpstream {
        /// The branch whose upstream was requested
        branch: String,
    },

    /// A conflicting rebase could not be aborted.
    #[error("rebase onto {onto} conflicted and `git rebase --abort` failed: {reason}")]
    AbortFailed {
        /// The rebase target
        onto: String,
        /// Why the abort failed
        reason: String,
    },
}

impl GitError {
    /// Classify a failed command result.
    fn from_result(invocation: &Invocation, result: &CommandResult) -> Self {
        if result.is_launch_failure() {
            GitError::Launch {
                command: invocation.args_line(),
                message: result.diagnostic(),
            }
        } else {
            let output = result.diagnostic();
            GitError::CommandFailed {
                command: invocation.args_line(),
                code: result.exit_code,
                output: if output.is_empty() {
                    "no output".to_string()
                } else {
                    output
                },
            }
        }
    }
}

/// How a rebase ended when it did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// The branch was replayed cleanly (or was already up to date).
    Applied,
    /// The replay hit conflicts and was aborted; the branch is unchanged.
    Conflict,
}

/// A git session for one repository.
#[derive(Debug, Clone)]
pub struct RepoHandle {
    info: Arc<RepoInfo>,
    runner: Arc<dyn CommandRunner>,
    branch: String,
    remotes: Vec<String>,
}

impl RepoHandle {
    /// Open a handle by querying the current branch and the remotes.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`GitError`] if either query fails.
    pub async fn open(
        info: Arc<RepoInfo>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, GitError> {
        let mut handle = Self {
            info,
            runner,
            branch: String::new(),
            remotes: Vec::new(),
        };

        let branch = handle.exec_ok(&["branch", "--show-current"]).await?;
        handle.branch = branch.output.into_iter().next().unwrap_or_default();

        let remotes = handle.exec_ok(&["remote"]).await?;
        handle.remotes = remotes
            .output
            .into_iter()
            .filter(|r| !r.is_empty())
            .collect();

        debug!(
            repo = %handle.info.name,
            branch = %handle.display_branch(),
            remotes = ?handle.remotes,
            "opened repository"
        );
        Ok(handle)
    }

    /// Display name of the repository.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Current branch name; empty when HEAD is detached.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Current branch name, or [`DETACHED_HEAD`].
    pub fn display_branch(&self) -> &str {
        if self.branch.is_empty() {
            DETACHED_HEAD
        } else {
            &self.branch
        }
    }

    /// True when HEAD is not on a branch.
    pub fn is_detached(&self) -> bool {
        self.branch.is_empty()
    }

    /// Configured remote names, in `git remote` order.
    pub fn remotes(&self) -> &[String] {
        &self.remotes
    }

    // =========================================================================
    // Remote and working tree
    // =========================================================================

    /// Update remote-tracking refs for the given remotes, or all remotes.
    pub async fn update_remote(&self, remotes: &[&str]) -> Result<(), GitError> {
        let mut args = vec!["remote", "update"];
        args.extend_from_slice(remotes);
        self.exec_ok(&args).await.map(|_| ())
    }

    /// Stash local modifications, including untracked files.
    ///
    /// Fails when there is nothing to stash on some git versions; callers
    /// treat this as best-effort.
    pub async fn stash(&self) -> Result<(), GitError> {
        self.exec_ok(&["stash", "--include-untracked"])
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve any reference to an abbreviated commit hash.
    pub async fn resolve_object(&self, object: &str) -> Result<String, GitError> {
        let args = ["rev-parse", "--short=4", object];
        let result = self.exec_ok(&args).await?;
        single_line(&args, result)
    }

    /// Resolve the upstream of `branch` to an abbreviated commit hash.
    ///
    /// A command-level failure means there is no upstream and is reported as
    /// [`GitError::NoUpstream`]. A launch failure stays a launch failure.
    pub async fn resolve_upstream(&self, branch: &str) -> Result<String, GitError> {
        let spec = format!("{}@{{upstream}}", branch);
        let args = ["rev-parse", "--short=4", spec.as_str()];
        let (invocation, result) = self.exec(&args).await;
        if result.is_launch_failure() {
            return Err(GitError::from_result(&invocation, &result));
        }
        if !result.passed {
            return Err(GitError::NoUpstream {
                branch: if branch.is_empty() {
                    DETACHED_HEAD.to_string()
                } else {
                    branch.to_string()
                },
            });
        }
        single_line(&args, result)
    }

    /// List local and remote-tracking branch names.
    ///
    /// Remote-tracking names keep their `remotes/<remote>/<branch>` form.
    pub async fn list_branches(&self) -> Result<Vec<String>, GitError> {
        let result = self.exec_ok(&["branch", "-a", "-l"]).await?;
        Ok(result
            .output
            .iter()
            .filter_map(|line| parse_branch_line(line))
            .collect())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Switch to an existing local branch.
    pub async fn checkout_local(&mut self, branch: &str) -> Result<(), GitError> {
        self.exec_ok(&["checkout", branch]).await?;
        self.branch = branch.to_string();
        Ok(())
    }

    /// Force-create `branch` tracking `<remote>/<branch>` and switch to it.
    pub async fn checkout_remote_tracking(
        &mut self,
        branch: &str,
        remote: &str,
    ) -> Result<(), GitError> {
        let upstream = format!("{}/{}", remote, branch);
        self.exec_ok(&["checkout", "-B", branch, "--track", upstream.as_str()])
            .await?;
        self.branch = branch.to_string();
        Ok(())
    }

    /// Replay the current branch onto `onto`.
    ///
    /// A conflict is rolled back with `git rebase --abort` and reported as
    /// [`RebaseOutcome::Conflict`].
    pub async fn rebase(&self, onto: &str) -> Result<RebaseOutcome, GitError> {
        let (invocation, result) = self.exec(&["rebase", onto]).await;
        if result.passed {
            return Ok(RebaseOutcome::Applied);
        }
        if result.is_launch_failure() || result.exit_code != REBASE_CONFLICT_EXIT {
            return Err(GitError::from_result(&invocation, &result));
        }

        debug!(repo = %self.info.name, onto, "rebase conflicted, aborting");
        let (abort, aborted) = self.exec(&["rebase", "--abort"]).await;
        if !aborted.passed {
            warn!(repo = %self.info.name, onto, "rebase --abort failed");
            return Err(GitError::AbortFailed {
                onto: onto.to_string(),
                reason: GitError::from_result(&abort, &aborted).to_string(),
            });
        }
        Ok(RebaseOutcome::Conflict)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn exec(&self, args: &[&str]) -> (Invocation, CommandResult) {
        let invocation = Invocation::new(args.iter().copied(), &self.info.path);
        let result = self.runner.run(&invocation).await;
        (invocation, result)
    }

    async fn exec_ok(&self, args: &[&str]) -> Result<CommandResult, GitError> {
        let (invocation, result) = self.exec(args).await;
        if result.passed {
            Ok(result)
        } else {
            Err(GitError::from_result(&invocation, &result))
        }
    }
}

fn single_line(args: &[&str], result: CommandResult) -> Result<String, GitError> {
    let mut lines = result.output.into_iter().filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(line), None) => Ok(line),
        (first, _) => Err(GitError::UnexpectedOutput {
            command: args.join(" "),
            lines: if first.is_none() { 0 } else { 2 + lines.count() },
        }),
    }
}

/// Normalise one line of `git branch -a -l` output.
///
/// Strips the current-branch (`* `) and worktree (`+ `) markers and the
/// symbolic-ref suffix (`remotes/origin/HEAD -> origin/main`), and drops
/// pseudo-entries such as `(HEAD detached at 1a2b)`.
pub fn parse_branch_line(line: &str) -> Option<String> {
    let line = line.trim();
    let line = line
        .strip_prefix("* ")
        .or_else(|| line.strip_prefix("+ "))
        .unwrap_or(line)
        .trim_start();
    if line.is_empty() || line.starts_with('(') {
        return None;
    }
    let name = match line.split_once(" -> ") {
        Some((name, _)) => name,
        None => line,
    };
    Some(name.to_string())
}
