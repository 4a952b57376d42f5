//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the configuration and repository list
//! 2. Calls the engine dispatcher
//! 3. Formats and displays output
//!
//! Handlers do NOT run git themselves.
//!
//! # Async Commands
//!
//! Workflows are async because every repository runs in its own task. Each
//! handler builds a tokio runtime and blocks on the async implementation.

mod completion;
mod find;
mod refresh;
mod status;
mod take;

pub use completion::completion;
pub use find::find;
pub use refresh::refresh;
pub use status::status;
pub use take::take;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::paths::{self, ConfigEnv};
use crate::core::repolist::{RepoInfo, RepoList};
use crate::engine::{self, Context, DispatchLimits, Dispatcher, WorkflowResult};
use crate::git::ProcessRunner;
use crate::ui::output::{self, Verbosity};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<ExitCode> {
    match command {
        Command::Take { branch } => take::take(ctx, &branch),
        Command::Status => status::status(ctx),
        Command::Find { branch } => find::find(ctx, &branch),
        Command::Refresh => refresh::refresh(ctx),
        Command::Completion { shell } => completion::completion(shell).map(|()| ExitCode::SUCCESS),
    }
}

/// Everything a fleet command needs, loaded from disk.
#[derive(Debug)]
struct Workspace {
    config: Config,
    config_path: PathBuf,
    repolist_path: PathBuf,
    repos: Vec<Arc<RepoInfo>>,
}

impl Workspace {
    /// Load the configuration only.
    fn config_only(ctx: &Context) -> Result<(Config, PathBuf, PathBuf)> {
        let env = ConfigEnv::from_process();
        let loaded = Config::load_with_env(ctx.config_path.as_deref(), &env)
            .context("could not load configuration")?;
        let repolist_path = paths::repolist_path(ctx.repolist_path.as_deref(), &env, &loaded.path);
        Ok((loaded.config, loaded.path, repolist_path))
    }

    /// Load the configuration and the repository list.
    fn load(ctx: &Context) -> Result<Self> {
        let (config, config_path, repolist_path) = Self::config_only(ctx)?;
        let list = RepoList::load(&repolist_path)
            .context("could not load the repository list (run `yeet refresh` first?)")?;
        Ok(Self {
            config,
            config_path,
            repolist_path,
            repos: list.shared(),
        })
    }

    /// A dispatcher running real git with configured and flag limits.
    fn dispatcher(&self, ctx: &Context) -> Dispatcher {
        let limits = ctx.limits(DispatchLimits::from_config(&self.config.dispatch));
        Dispatcher::new(Arc::new(ProcessRunner::git()), self.config.clone()).with_limits(limits)
    }

    fn describe(&self, verbosity: Verbosity) {
        output::debug(
            format!(
                "config {}, repository list {}",
                self.config_path.display(),
                self.repolist_path.display()
            ),
            verbosity,
        );
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("could not start the async runtime")
}

/// Print the closing output of a take or status run and pick the exit code.
fn finish(ctx: &Context, results: &[WorkflowResult], elapsed: Duration) -> Result<ExitCode> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    if ctx.json {
        println!("{}", output::to_json(&results)?);
    } else {
        output::print(output::format_summary(results, elapsed), verbosity);
    }
    Ok(if engine::any_failed(results) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print one result line as it arrives, unless JSON output was requested.
fn live_printer(ctx: &Context) -> impl FnMut(&WorkflowResult) {
    let json = ctx.json;
    let color = !json && output::use_color();
    move |result: &WorkflowResult| {
        if !json {
            println!("{}", output::format_result(result, color));
        }
    }
}
