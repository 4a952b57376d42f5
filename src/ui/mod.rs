//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Result lines, summaries and JSON output
//! - [`logging`] - Tracing subscriber setup
//!
//! # Design
//!
//! All terminal output goes through this module so that quiet mode, JSON
//! mode and color detection are handled in one place.

pub mod logging;
pub mod output;
