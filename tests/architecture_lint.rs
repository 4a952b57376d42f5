//! Architecture enforcement tests.
//!
//! The layering documented in `src/lib.rs` is checked here so violations
//! are caught in CI rather than in review.
//!
//! # Test Categories
//!
//! 1. **Process Isolation** - Only `src/git` may spawn child processes
//! 2. **Layer Direction** - Lower layers must not import `cli` or `ui`
//! 3. **Handler Thinness** - Command handlers must not run git themselves

use std::fs;
use std::path::{Path, PathBuf};

/// Patterns that spawn a child process.
const PROCESS_PATTERNS: &[&str] = &[
    "std::process::Command",
    "process::Command::new",
    "tokio::process",
];

/// Layers that must never depend on presentation code.
const LOWER_LAYERS: &[&str] = &["src/core", "src/engine", "src/git"];

/// Imports that reach up into presentation code.
const UPWARD_IMPORTS: &[&str] = &["crate::cli", "crate::ui"];

/// Collect every `.rs` file under `dir`.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap_or_else(|_| panic!("Failed to read {:?}", dir)) {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Source text before the first `#[cfg(test)]` module.
fn production_source(path: &Path) -> String {
    let content =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    match content.find("#[cfg(test)]") {
        Some(idx) => content[..idx].to_string(),
        None => content,
    }
}

// =============================================================================
// Process Isolation
// =============================================================================

/// Verify that only the git layer spawns processes.
///
/// Every external command goes through `CommandRunner`, so workflows can be
/// driven by the mock runner in tests.
#[test]
fn only_git_layer_spawns_processes() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src")) {
        if path.starts_with("src/git") {
            continue;
        }
        let content = production_source(&path);
        for pattern in PROCESS_PATTERNS {
            if content.contains(pattern) {
                violations.push(format!("{}: uses {}", path.display(), pattern));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Process spawning outside src/git:\n  {}",
        violations.join("\n  ")
    );
}

// =============================================================================
// Layer Direction
// =============================================================================

/// Verify that core, engine, and git never import cli or ui.
#[test]
fn lower_layers_do_not_import_presentation() {
    let mut violations = Vec::new();

    for layer in LOWER_LAYERS {
        for path in rust_files(Path::new(layer)) {
            let content = production_source(&path);
            for import in UPWARD_IMPORTS {
                if content.contains(import) {
                    violations.push(format!("{}: imports {}", path.display(), import));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Layering violations found:\n  {}",
        violations.join("\n  ")
    );
}

/// Verify that the core layer stays free of workflow code.
#[test]
fn core_does_not_import_engine() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/core")) {
        if production_source(&path).contains("crate::engine") {
            violations.push(path.display().to_string());
        }
    }

    assert!(
        violations.is_empty(),
        "core imports engine:\n  {}",
        violations.join("\n  ")
    );
}

// =============================================================================
// Handler Thinness
// =============================================================================

/// Verify that command handlers delegate workflows to the engine.
///
/// Handlers may construct a `ProcessRunner` but must not open repositories
/// or call workflow functions directly.
#[test]
fn handlers_delegate_to_dispatcher() {
    let command_dir = Path::new("src/cli/commands");
    let mut violations = Vec::new();

    for path in rust_files(command_dir) {
        let filename = path.file_name().unwrap().to_str().unwrap().to_string();
        let content = production_source(&path);

        for forbidden in ["RepoHandle::open", "engine::take::take", "engine::status::status"] {
            if content.contains(forbidden) {
                violations.push(format!("{}: calls {}", filename, forbidden));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Handlers bypassing the dispatcher:\n  {}",
        violations.join("\n  ")
    );
}
