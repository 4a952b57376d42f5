//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Result lines go to stdout, everything else to stderr, so the result
//! stream can be piped. Output respects the quiet flag. When `--json` is
//! enabled, result lines are replaced by one machine-readable document.
//!
//! # Result lines
//!
//! ```text
//!  PASSED [main]: [ab12] -> [cd34]...................alpha
//! ```
//!
//! The message is padded with dots to [`MESSAGE_WIDTH`] so repository names
//! line up. Longer messages push the name right.

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

use crossterm::style::Stylize;

use crate::engine::{SearchResult, Status, WorkflowResult};

/// Column the repository name starts at, relative to the message.
pub const MESSAGE_WIDTH: usize = 45;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - result lines only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Whether stdout gets ANSI colors.
pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Status label, colored when `color` is set.
pub fn format_status(status: Status, color: bool) -> String {
    let label = status.label();
    if !color {
        return label.to_string();
    }
    match status {
        Status::Passed | Status::Current => label.green().to_string(),
        Status::Failed => label.red().to_string(),
        Status::Conflict | Status::Behind => label.yellow().to_string(),
    }
}

/// One result line, without a trailing newline.
pub fn format_result(result: &WorkflowResult, color: bool) -> String {
    let fill = MESSAGE_WIDTH.saturating_sub(result.message.chars().count());
    format!(
        " {} {}{}{}",
        format_status(result.status, color),
        result.message,
        ".".repeat(fill),
        result.repo_name
    )
}

/// One line per matching branch: `repo: branch`.
pub fn format_search(result: &SearchResult, color: bool) -> String {
    result
        .branches
        .iter()
        .map(|branch| {
            if color {
                format!(
                    "{}: {}",
                    result.repo_name.as_str().yellow(),
                    branch.as_str().green(),
                )
            } else {
                format!("{}: {}", result.repo_name, branch)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run summary: counts per status and elapsed time.
pub fn format_summary(results: &[WorkflowResult], elapsed: Duration) -> String {
    let mut counts = Vec::new();
    for status in Status::ALL {
        let n = results.iter().filter(|r| r.status == status).count();
        if n > 0 {
            counts.push(format!("{} {}", n, status.label()));
        }
    }
    let counts = if counts.is_empty() {
        "no repositories".to_string()
    } else {
        counts.join(", ")
    };
    format!("{} in {:.2}s", counts, elapsed.as_secs_f64())
}

/// Serialize results as pretty JSON.
pub fn to_json<T: serde::Serialize>(results: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}
