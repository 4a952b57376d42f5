//! engine::outcome
//!
//! Per-repository results and the message builder that renders them.
//!
//! # Messages
//!
//! A take message has up to five parts:
//!
//! ```text
//! [previous] -> [new branch]: [old hash] -> [new hash] note
//! ```
//!
//! Absent parts are omitted. The branch-change segment appears only when the
//! workflow switched branches; the hash-change segment only when HEAD moved.
//! A conflict never reports a new hash because the branch was rolled back.

use std::fmt;

use serde::Serialize;

/// Final state of one repository after a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The repository ended on the expected branch, rebased if needed.
    Passed,
    /// An operation failed; the message carries the error.
    Failed,
    /// A rebase conflicted and was aborted.
    Conflict,
    /// The branch matches its upstream.
    Current,
    /// The branch differs from its upstream.
    Behind,
}

impl Status {
    /// Every status, in code order.
    pub const ALL: [Status; 5] = [
        Status::Passed,
        Status::Failed,
        Status::Conflict,
        Status::Current,
        Status::Behind,
    ];

    /// Six-character label used in terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::Conflict => "CNFLCT",
            Status::Current => "CURRNT",
            Status::Behind => "BEHIND",
        }
    }

    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            Status::Passed => 0,
            Status::Failed => 1,
            Status::Conflict => 2,
            Status::Current => 3,
            Status::Behind => 4,
        }
    }

    /// True for statuses that make the run exit non-zero.
    pub fn is_failure(self) -> bool {
        self == Status::Failed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one workflow on one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowResult {
    /// Repository display name
    #[serde(rename = "name")]
    pub repo_name: String,
    /// Final status
    pub status: Status,
    /// Human-readable detail
    pub message: String,
}

impl WorkflowResult {
    /// Create a result.
    pub fn new(repo_name: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            status,
            message: message.into(),
        }
    }

    /// A FAILED result.
    pub fn failed(repo_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(repo_name, Status::Failed, message)
    }
}

/// Accumulates what a take workflow observed, then renders the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    repo_name: String,
    previous_branch: String,
    branch: Option<String>,
    old_hash: Option<String>,
    new_hash: Option<String>,
    note: Option<String>,
}

impl Report {
    /// Start a report for a repository on `previous_branch`.
    pub fn new(repo_name: impl Into<String>, previous_branch: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            previous_branch: previous_branch.into(),
            branch: None,
            old_hash: None,
            new_hash: None,
            note: None,
        }
    }

    /// Record a branch switch. Switching to the starting branch is not a change.
    pub fn switched_to(&mut self, branch: &str) {
        self.branch = (branch != self.previous_branch).then(|| branch.to_string());
    }

    /// Record HEAD before any rebase.
    pub fn old_hash(&mut self, hash: impl Into<String>) {
        self.old_hash = Some(hash.into());
    }

    /// Record HEAD after the workflow.
    pub fn new_hash(&mut self, hash: impl Into<String>) {
        self.new_hash = Some(hash.into());
    }

    /// Attach a trailing note.
    pub fn note(&mut self, note: impl Into<String>) {
        self.note = Some(note.into());
    }

    /// Render the message.
    pub fn render(&self) -> String {
        self.render_with(true)
    }

    fn render_with(&self, include_new_hash: bool) -> String {
        let mut message = format!("[{}]", self.previous_branch);
        if let Some(branch) = &self.branch {
            message.push_str(&format!(" -> [{}]", branch));
        }
        if let Some(old) = &self.old_hash {
            message.push_str(&format!(": [{}]", old));
            match &self.new_hash {
                Some(new) if include_new_hash && new != old => {
                    message.push_str(&format!(" -> [{}]", new));
                }
                _ => {}
            }
        }
        if let Some(note) = &self.note {
            message.push(' ');
            message.push_str(note);
        }
        message
    }

    /// Produce the final result with `status`.
    pub fn conclude(&self, status: Status) -> WorkflowResult {
        WorkflowResult::new(
            self.repo_name.clone(),
            status,
            self.render_with(status != Status::Conflict),
        )
    }

    /// Produce a FAILED result carrying `error` after the rendered context.
    pub fn fail(&self, error: impl fmt::Display) -> WorkflowResult {
        WorkflowResult::failed(
            self.repo_name.clone(),
            format!("{} {}", self.render_with(false), error),
        )
    }
}

/// Branches in one repository that match a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Repository display name
    #[serde(rename = "name")]
    pub repo_name: String,
    /// Matching local and remote-tracking branch names
    pub branches: Vec<String>,
}

impl SearchResult {
    /// True when at least one branch matched.
    pub fn found(&self) -> bool {
        !self.branches.is_empty()
    }
}
