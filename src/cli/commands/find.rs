//! cli::commands::find
//!
//! Find which repositories have a branch.
//!
//! Only repositories with a match are printed. Repositories that could not
//! be searched are reported as warnings and do not change the exit code.

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use super::{runtime, Workspace};
use crate::core::types::BranchName;
use crate::engine::{Context, SearchResult};
use crate::ui::output::{self, Verbosity};

/// Run the find command.
pub fn find(ctx: &Context, branch: &str) -> Result<ExitCode> {
    let target = BranchName::new(branch).context("invalid branch name")?;
    let workspace = Workspace::load(ctx)?;
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    workspace.describe(verbosity);

    let rt = runtime()?;
    let results = rt.block_on(workspace.dispatcher(ctx).find(&target, &workspace.repos));

    let mut found: Vec<SearchResult> = Vec::new();
    for result in results {
        match result {
            Ok(search) if search.found() => found.push(search),
            Ok(_) => {}
            Err(failed) => output::warn(
                format!("{}: {}", failed.repo_name, failed.message),
                verbosity,
            ),
        }
    }
    found.sort_by(|a, b| a.repo_name.cmp(&b.repo_name));

    if ctx.json {
        println!("{}", output::to_json(&found)?);
    } else if found.is_empty() {
        println!("Nothing found for {}", target);
    } else {
        let color = output::use_color();
        for search in &found {
            println!("{}", output::format_search(search, color));
        }
    }
    Ok(ExitCode::SUCCESS)
}
