//! git::mock
//!
//! Scripted command runner for deterministic testing.
//!
//! # Design
//!
//! Responses are keyed by the argument line (`rebase origin/main`) and,
//! optionally, by working directory. Each key holds a queue: responses are
//! handed out in order and the last one repeats. Anything unscripted fails
//! with exit code 128, the way git does for an unknown revision, so a
//! missing script shows up as a failed workflow rather than a hang.
//!
//! Every invocation is recorded for later inspection.
//!
//! # Example
//!
//! ```
//! use yeet::git::mock::MockRunner;
//! use yeet::git::{CommandResult, CommandRunner, Invocation};
//!
//! # tokio_test::block_on(async {
//! let mock = MockRunner::new();
//! mock.respond("rev-parse --short=4 HEAD", CommandResult::success(["ab12"]));
//!
//! let result = mock
//!     .run(&Invocation::new(["rev-parse", "--short=4", "HEAD"], "/code/alpha"))
//!     .await;
//! assert_eq!(result.output, vec!["ab12"]);
//! assert!(mock.ran("rev-parse --short=4 HEAD"));
//! # });
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::command::{CommandResult, CommandRunner, Invocation};

/// Mock runner for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    inner: Arc<Mutex<MockRunnerInner>>,
}

#[derive(Debug, Default)]
struct MockRunnerInner {
    /// Queued responses per key.
    scripts: HashMap<ScriptKey, Vec<CommandResult>>,
    /// Artificial latency per key.
    delays: HashMap<ScriptKey, Duration>,
    /// Every invocation, in arrival order.
    calls: Vec<Invocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScriptKey {
    dir: Option<PathBuf>,
    args: String,
}

impl MockRunner {
    /// Create a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the two queries every handle makes when it opens.
    pub fn with_repo_state(self, branch: &str, remotes: &[&str]) -> Self {
        let branch: Vec<&str> = if branch.is_empty() { vec![] } else { vec![branch] };
        self.respond("branch --show-current", CommandResult::success(branch));
        self.respond("remote", CommandResult::success(remotes.iter().copied()));
        self
    }

    /// Queue a response for an argument line in any directory.
    pub fn respond(&self, args: &str, result: CommandResult) {
        self.push(
            ScriptKey {
                dir: None,
                args: args.to_string(),
            },
            result,
        );
    }

    /// Queue a response for an argument line in one directory.
    ///
    /// Directory-specific scripts take precedence over global ones.
    pub fn respond_in(&self, dir: impl AsRef<Path>, args: &str, result: CommandResult) {
        self.push(
            ScriptKey {
                dir: Some(dir.as_ref().to_path_buf()),
                args: args.to_string(),
            },
            result,
        );
    }

    /// Make an argument line in one directory take `delay` before answering.
    pub fn delay_in(&self, dir: impl AsRef<Path>, args: &str, delay: Duration) {
        self.lock().delays.insert(
            ScriptKey {
                dir: Some(dir.as_ref().to_path_buf()),
                args: args.to_string(),
            },
            delay,
        );
    }

    /// Argument lines recorded in one directory, in order.
    pub fn calls_in(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = dir.as_ref();
        self.lock()
            .calls
            .iter()
            .filter(|c| c.dir == dir)
            .map(Invocation::args_line)
            .collect()
    }

    /// True if an argument line was run anywhere.
    pub fn ran(&self, args: &str) -> bool {
        self.count(args) > 0
    }

    /// How many times an argument line was run anywhere.
    pub fn count(&self, args: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.args_line() == args)
            .count()
    }

    fn push(&self, key: ScriptKey, result: CommandResult) {
        self.lock().scripts.entry(key).or_default().push(result);
    }

    fn lock(&self) -> MutexGuard<'_, MockRunnerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_response(&self, invocation: &Invocation) -> (CommandResult, Option<Duration>) {
        let mut inner = self.lock();
        inner.calls.push(invocation.clone());

        let specific = ScriptKey {
            dir: Some(invocation.dir.clone()),
            args: invocation.args_line(),
        };
        let global = ScriptKey {
            dir: None,
            args: invocation.args_line(),
        };
        let delay = inner.delays.get(&specific).copied();

        let key = if inner.scripts.contains_key(&specific) {
            specific
        } else {
            global
        };
        let result = match inner.scripts.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => CommandResult::failure(128, Vec::<String>::new()).with_stderr([format!(
                "fatal: unscripted command `{}`",
                invocation.args_line()
            )]),
        };
        (result, delay)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, invocation: &Invocation) -> CommandResult {
        let (result, delay) = self.next_response(invocation);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
