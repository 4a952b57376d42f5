//! engine
//!
//! Per-repository workflows and the dispatcher that runs them fleet-wide.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher ─┬─ task ─ RepoHandle::open ─ workflow ─┐
//!             ├─ task ─ RepoHandle::open ─ workflow ─┼─ mpsc ─ results
//!             └─ task ─ RepoHandle::open ─ workflow ─┘
//! ```
//!
//! - [`take`] - move a repository onto a target branch
//! - [`status`] - compare HEAD with upstream, read-only
//! - [`find`] - locate a branch, read-only and offline
//! - [`cases`] - pure remote and case selection
//! - [`outcome`] - statuses, results and message rendering
//! - [`dispatch`] - concurrent fan-out and fan-in
//!
//! # Invariants
//!
//! - Every run yields exactly one result per repository
//! - A failure in one repository never affects another
//! - Within a repository, git operations run strictly in sequence
//! - Workflows never panic on git errors; errors become FAILED results

pub mod cases;
pub mod dispatch;
pub mod find;
pub mod outcome;
pub mod status;
pub mod take;

pub use cases::{select_case, select_remote, BranchInventory, Case};
pub use dispatch::{DispatchLimits, Dispatcher};
pub use outcome::{Report, SearchResult, Status, WorkflowResult};

use std::path::PathBuf;
use std::time::Duration;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit config file.
    pub config_path: Option<PathBuf>,
    /// Explicit repository list file.
    pub repolist_path: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (result lines only).
    pub quiet: bool,
    /// Emit results as JSON.
    pub json: bool,
    /// Per-repository deadline override.
    pub timeout: Option<Duration>,
    /// Concurrency limit override.
    pub jobs: Option<usize>,
}

impl Context {
    /// Merge the command-line overrides into configured limits.
    pub fn limits(&self, configured: DispatchLimits) -> DispatchLimits {
        configured.with_overrides(self.timeout, self.jobs)
    }
}

/// True when any result should make the process exit non-zero.
pub fn any_failed(results: &[WorkflowResult]) -> bool {
    results.iter().any(|r| r.status.is_failure())
}
