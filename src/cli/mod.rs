//! cli
//!
//! Command-line interface layer for yeet.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging
//! - Delegate to command handlers
//! - Does NOT run git directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands the work to
//! the [`crate::engine`] dispatcher. Handlers decide the process exit code:
//! non-zero when any repository ended FAILED.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::process::ExitCode;

use crate::engine;
use crate::ui;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    ui::logging::init_tracing(cli.debug);

    let ctx = engine::Context {
        config_path: cli.config.clone(),
        repolist_path: cli.repolist.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
        timeout: cli.timeout(),
        jobs: cli.jobs(),
    };

    commands::dispatch(cli.command, &ctx)
}
