//! cli::commands::take
//!
//! Move every repository onto a branch.
//!
//! # Example
//!
//! ```bash
//! # Put the whole fleet on feature-x
//! yeet take feature-x
//!
//! # Back to master, results only
//! yeet take main --quiet
//! ```

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context as _, Result};

use super::{finish, live_printer, runtime, Workspace};
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Run the take command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn take(ctx: &Context, branch: &str) -> Result<ExitCode> {
    let target = BranchName::new(branch).context("invalid target branch")?;
    let workspace = Workspace::load(ctx)?;
    let rt = runtime()?;
    rt.block_on(take_async(ctx, &workspace, &target))
}

async fn take_async(ctx: &Context, workspace: &Workspace, target: &BranchName) -> Result<ExitCode> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    workspace.describe(verbosity);
    if !ctx.json {
        output::print(
            format!(
                "Taking {} in {} repositories (master {}, remote {})",
                target,
                workspace.repos.len(),
                workspace.config.master_branch,
                workspace.config.remote
            ),
            verbosity,
        );
    }

    let started = Instant::now();
    let results = workspace
        .dispatcher(ctx)
        .take(target, &workspace.repos, live_printer(ctx))
        .await;
    finish(ctx, &results, started.elapsed())
}
