//! cli::commands::refresh
//!
//! Rebuild the repository list from `repo list -f`.

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use super::{runtime, Workspace};
use crate::core::repolist::{RepoList, DISCOVERY_PROGRAM};
use crate::engine::Context;
use crate::git::ProcessRunner;
use crate::ui::output::{self, Verbosity};

/// Run the refresh command.
pub fn refresh(ctx: &Context) -> Result<ExitCode> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let (config, _, repolist_path) = Workspace::config_only(ctx)?;

    let runner = ProcessRunner::new(DISCOVERY_PROGRAM);
    let rt = runtime()?;
    let list = rt
        .block_on(RepoList::discover(&runner, &config.repo_dir))
        .context("could not discover repositories")?;
    list.save(&repolist_path)?;

    output::print(
        format!(
            "Saved {} repositories to {}",
            list.len(),
            repolist_path.display()
        ),
        verbosity,
    );
    Ok(ExitCode::SUCCESS)
}
