//! git::command
//!
//! Process-level execution of external commands.
//!
//! # Design
//!
//! [`CommandRunner`] turns an [`Invocation`] (arguments plus working
//! directory) into a [`CommandResult`]. The result distinguishes three
//! outcomes that callers must treat differently:
//!
//! - passed: the process exited with status 0
//! - failed: the process ran and exited non-zero (`exit_code` is real)
//! - launch failure: the process never started (`exit_code` is 1 and
//!   [`CommandResult::is_launch_failure`] is true)
//!
//! The runner never retries and never imposes a deadline. Children are
//! spawned with `kill_on_drop`, so a caller that abandons the future (for
//! example through `tokio::time::timeout`) terminates the process.
//!
//! # Example
//!
//! ```no_run
//! use yeet::git::{CommandRunner, Invocation, ProcessRunner};
//!
//! # tokio_test::block_on(async {
//! let git = ProcessRunner::git();
//! let result = git
//!     .run(&Invocation::new(["rev-parse", "--short=4", "HEAD"], "."))
//!     .await;
//! if result.passed {
//!     println!("HEAD is {}", result.output[0]);
//! }
//! # });
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

/// Program name used for all git invocations.
pub const GIT_PROGRAM: &str = "git";

/// One external command to run: arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Arguments passed to the program (without the program name).
    pub args: Vec<String>,
    /// Directory the command runs in.
    pub dir: PathBuf,
}

impl Invocation {
    /// Create an invocation from arguments and a working directory.
    pub fn new<I, S>(args: I, dir: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Arguments joined by single spaces, e.g. `rebase --abort`.
    pub fn args_line(&self) -> String {
        self.args.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args_line())
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Standard output, one entry per line, surrounding spaces trimmed.
    pub output: Vec<String>,
    /// Standard error, one entry per line. Used only for diagnostics.
    pub stderr: Vec<String>,
    /// True when the process exited with status 0.
    pub passed: bool,
    /// Process exit code; 0 on success, 1 for launch failures and signals.
    pub exit_code: i32,
    /// Set when the process could not be started.
    pub launch_error: Option<String>,
}

impl CommandResult {
    /// A successful result with the given output lines.
    pub fn success<I, S>(output: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: output.into_iter().map(Into::into).collect(),
            stderr: Vec::new(),
            passed: true,
            exit_code: 0,
            launch_error: None,
        }
    }

    /// A non-zero exit with the given code and output lines.
    pub fn failure<I, S>(exit_code: i32, output: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: output.into_iter().map(Into::into).collect(),
            stderr: Vec::new(),
            passed: false,
            exit_code,
            launch_error: None,
        }
    }

    /// The process could not be started at all.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            output: Vec::new(),
            stderr: Vec::new(),
            passed: false,
            exit_code: 1,
            launch_error: Some(message.into()),
        }
    }

    /// Attach standard error lines.
    pub fn with_stderr<I, S>(mut self, stderr: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stderr = stderr.into_iter().map(Into::into).collect();
        self
    }

    /// True when the process never started.
    pub fn is_launch_failure(&self) -> bool {
        self.launch_error.is_some()
    }

    /// Short human-readable summary of what the command printed.
    ///
    /// Prefers stderr (where git reports errors), falls back to stdout, and
    /// keeps only the last few lines.
    pub fn diagnostic(&self) -> String {
        const MAX_LINES: usize = 3;

        if let Some(message) = &self.launch_error {
            return message.clone();
        }
        let source = if self.stderr.iter().any(|l| !l.is_empty()) {
            &self.stderr
        } else {
            &self.output
        };
        let lines: Vec<&str> = source
            .iter()
            .map(String::as_str)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(MAX_LINES);
        lines[start..].join("; ")
    }
}

/// Runs external commands.
///
/// This is the only seam between the workflows and the operating system.
/// Implementations must be shareable across tasks.
#[async_trait]
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Run one invocation to completion.
    async fn run(&self, invocation: &Invocation) -> CommandResult;
}

/// Runs a real program as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    /// Runner for an arbitrary program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runner for `git`.
    pub fn git() -> Self {
        Self::new(GIT_PROGRAM)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::git()
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> CommandResult {
        debug!(
            program = %self.program.display(),
            dir = %invocation.dir.display(),
            args = %invocation.args_line(),
            "spawning"
        );

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.dir)
            // A credential prompt would block the task forever.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match command.output().await {
            Ok(output) => output,
            Err(err) => {
                debug!(error = %err, "failed to launch");
                return CommandResult::launch_failure(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    err
                ));
            }
        };

        let stdout = split_lines(&output.stdout);
        let stderr = split_lines(&output.stderr);

        let result = if output.status.success() {
            CommandResult::success(stdout)
        } else {
            // Killed by a signal: no exit code.
            CommandResult::failure(output.status.code().unwrap_or(1), stdout)
        };
        let result = result.with_stderr(stderr);

        debug!(
            passed = result.passed,
            exit_code = result.exit_code,
            lines = result.output.len(),
            "finished"
        );
        result
    }
}

/// Split captured bytes into lines, trimming surrounding spaces and CRs.
fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_matches(|c| c == ' ' || c == '\r').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod result {
        use super::*;

        #[test]
        fn constructors() {
            let ok = CommandResult::success(["abcd"]);
            assert!(ok.passed);
            assert_eq!(ok.exit_code, 0);
            assert!(!ok.is_launch_failure());

            let failed = CommandResult::failure(128, ["fatal: bad revision"]);
            assert!(!failed.passed);
            assert_eq!(failed.exit_code, 128);
            assert!(!failed.is_launch_failure());

            let launch = CommandResult::launch_failure("no such file");
            assert!(!launch.passed);
            assert_eq!(launch.exit_code, 1);
            assert!(launch.output.is_empty());
            assert!(launch.is_launch_failure());
        }

        #[test]
        fn diagnostic_prefers_stderr() {
            let result = CommandResult::failure(1, ["stdout line"])
                .with_stderr(["", "error: could not apply 1234", "hint: resolve"]);
            assert_eq!(
                result.diagnostic(),
                "error: could not apply 1234; hint: resolve"
            );
        }

        #[test]
        fn diagnostic_falls_back_to_stdout_and_truncates() {
            let result = CommandResult::failure(1, ["a", "b", "c", "d"]);
            assert_eq!(result.diagnostic(), "b; c; d");
        }
    }

    #[test]
    fn split_lines_trims() {
        let lines = split_lines(b"* main\r\n  remotes/origin/main\n");
        assert_eq!(lines, vec!["* main", "remotes/origin/main"]);
    }

    #[test]
    fn invocation_display() {
        let inv = Invocation::new(["rebase", "--abort"], "/tmp");
        assert_eq!(inv.to_string(), "rebase --abort");
    }

    #[tokio::test]
    async fn launch_failure_is_distinguishable() {
        let runner = ProcessRunner::new("definitely-not-a-real-program-yeet");
        let dir = tempfile::tempdir().unwrap();
        let result = runner.run(&Invocation::new(["--version"], dir.path())).await;
        assert!(!result.passed);
        assert_eq!(result.exit_code, 1);
        assert!(result.is_launch_failure());
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn nonzero_exit_keeps_real_code() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessRunner::git()
            .run(&Invocation::new(["rev-parse", "0000"], dir.path()))
            .await;
        assert!(!result.passed);
        assert!(!result.is_launch_failure());
        assert_eq!(result.exit_code, 128);
    }
}
