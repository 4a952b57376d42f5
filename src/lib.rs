//! yeet - move a fleet of git repositories onto one branch
//!
//! yeet takes a list of independent repositories and, concurrently, puts
//! each of them on a target branch rebased onto the master branch. Where
//! the target does not exist, the repository is brought up to date on
//! master instead. Every repository yields exactly one status line.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Per-repository workflows and the concurrent dispatcher
//! - [`core`] - Configuration, repository list, and strong types
//! - [`git`] - Single interface for all git operations
//! - [`ui`] - Output formatting and logging
//!
//! # Correctness Invariants
//!
//! yeet maintains the following invariants:
//!
//! 1. Every run reports exactly one result per repository
//! 2. A rebase that conflicts is always aborted before the result is reported
//! 3. Without a suitable remote, a repository is left untouched
//! 4. One repository's failure never affects another

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
