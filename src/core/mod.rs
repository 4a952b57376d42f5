//! core
//!
//! Core domain types, schemas, and persisted state for yeet.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, RemoteName
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for yeet's files
//! - [`repolist`] - The persisted repository list and its discovery
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Configuration is an explicit value, never process-wide state

pub mod config;
pub mod paths;
pub mod repolist;
pub mod types;
