//! git
//!
//! Single interface for all git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to git. Every other module talks to a
//! repository through a [`RepoHandle`], and every handle talks to the
//! operating system through a [`CommandRunner`]. Nothing outside this module
//! spawns processes.
//!
//! git is driven through its command line rather than a library binding so
//! that hooks, credential helpers and user configuration behave exactly as
//! they do in the user's shell.
//!
//! # Layers
//!
//! - [`command`]: launch one process, capture output and exit code
//! - [`handle`]: interpret results as typed repository operations
//! - [`mock`]: scripted runner for tests
//!
//! # Invariants
//!
//! - Runners never retry and never impose deadlines
//! - A rebase that stops on conflicts is always aborted before returning
//! - A handle's branch changes only when its own checkout succeeds

pub mod command;
pub mod handle;
pub mod mock;

pub use command::{CommandResult, CommandRunner, Invocation, ProcessRunner, GIT_PROGRAM};
pub use handle::{parse_branch_line, GitError, RebaseOutcome, RepoHandle, DETACHED_HEAD};
