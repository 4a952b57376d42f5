//! cli::commands::status
//!
//! Compare every repository with its upstream.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;

use super::{finish, live_printer, runtime, Workspace};
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Run the status command.
pub fn status(ctx: &Context) -> Result<ExitCode> {
    let workspace = Workspace::load(ctx)?;
    let rt = runtime()?;
    rt.block_on(status_async(ctx, &workspace))
}

async fn status_async(ctx: &Context, workspace: &Workspace) -> Result<ExitCode> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    workspace.describe(verbosity);
    if !ctx.json {
        output::print(
            format!("Checking {} repositories", workspace.repos.len()),
            verbosity,
        );
    }

    let started = Instant::now();
    let results = workspace
        .dispatcher(ctx)
        .status(&workspace.repos, live_printer(ctx))
        .await;
    finish(ctx, &results, started.elapsed())
}
