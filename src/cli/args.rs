//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--repolist <path>`: Use this repository list
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Result lines only
//! - `--json`: Machine-readable results
//! - `--timeout <secs>`: Per-repository deadline
//! - `--jobs <n>` / `-j`: Concurrency limit

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// yeet - move a fleet of git repositories onto one branch
#[derive(Parser, Debug)]
#[command(name = "yeet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository list to use instead of the one next to the config
    #[arg(long, global = true, value_name = "PATH")]
    pub repolist: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print result lines only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Give up on a repository after this many seconds
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Work on at most this many repositories at once
    #[arg(
        short,
        long,
        global = true,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub jobs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The `--timeout` flag as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// The `--jobs` flag as a count.
    pub fn jobs(&self) -> Option<usize> {
        self.jobs.map(|n| usize::try_from(n).unwrap_or(usize::MAX))
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move every repository onto a branch
    #[command(
        name = "take",
        long_about = "Move every repository onto a branch.\n\n\
            For each repository yeet stashes local changes, updates the remote, \
            and then puts HEAD on the requested branch, rebased onto the master \
            branch. Repositories that do not have the branch are brought up to \
            date on master instead. A rebase that conflicts is aborted and \
            reported as CNFLCT; the repository is left as it was.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Start a feature that spans several repositories
    yeet take feature-x

    # Go back to master everywhere
    yeet take main

    # Bound each repository to two minutes, four at a time
    yeet take release-9 --timeout 120 --jobs 4

READING THE OUTPUT:
    PASSED [main] -> [feature-x]: [ab12] -> [cd34]....alpha
           ^ previous  ^ new branch  ^ old    ^ new HEAD"
    )]
    Take {
        /// Branch to move onto
        branch: String,
    },

    /// Compare each repository with its upstream
    #[command(
        name = "status",
        long_about = "Compare each repository's HEAD with its upstream.\n\n\
            Updates remote-tracking refs, then reports CURRNT when HEAD matches \
            the upstream and BEHIND when it does not. Nothing is checked out, \
            stashed or rebased."
    )]
    Status,

    /// Find which repositories have a branch
    #[command(
        name = "find",
        long_about = "List the local and remote-tracking branches named BRANCH in \
            every repository.\n\nUses the refs already present locally; run \
            `yeet status` first to refresh them."
    )]
    Find {
        /// Branch name to look for
        branch: String,
    },

    /// Rebuild the repository list
    #[command(
        name = "refresh",
        long_about = "Rebuild the repository list by running `repo list -f` in the \
            configured repo_dir and saving the result."
    )]
    Refresh,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    yeet completion bash > ~/.local/share/bash-completion/completions/yeet

    # Zsh
    yeet completion zsh > ~/.zfunc/_yeet

    # Fish
    yeet completion fish > ~/.config/fish/completions/yeet.fish

    # PowerShell
    yeet completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "yeet", "take", "feature-x", "--timeout", "30", "-j", "2", "--quiet",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cli.jobs(), Some(2));
        match cli.command {
            Command::Take { branch } => assert_eq!(branch, "feature-x"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn zero_limits_rejected() {
        assert!(Cli::try_parse_from(["yeet", "status", "--jobs", "0"]).is_err());
        assert!(Cli::try_parse_from(["yeet", "status", "--timeout", "0"]).is_err());
    }

    #[test]
    fn take_requires_branch() {
        assert!(Cli::try_parse_from(["yeet", "take"]).is_err());
    }
}
