//! The snapshotter command-line interface.
//!
//! This module is the main entry point for all CLI commands. Each command
//! works on golden files through the same store and comparison code the
//! library uses during tests.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::cli::args::{Command, SnapshotterArgs};
use crate::snapshotter::{first_difference, Mismatch};
use crate::store::{self, SNAPSHOT_SUFFIX};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = SnapshotterArgs::parse();
    init_tracing();

    let result = match args.command {
        Command::List { dir } => handle_list(&dir),
        Command::Show { file } => handle_show(&file),
        Command::Check { dir } => handle_check(&dir),
        Command::Diff { expected, received } => handle_diff(&expected, &received),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(report) => {
            eprintln!("{report:?}");
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Finds every golden file below `dir`, sorted by path.
pub fn discover_golden_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(SNAPSHOT_SUFFIX))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

/// Handles the `list` subcommand.
fn handle_list(dir: &Path) -> miette::Result<bool> {
    let mut ok = true;
    for path in discover_golden_files(dir) {
        match store::load(&path) {
            Ok(set) => output::print_listing(&path, &set).into_diagnostic()?,
            Err(e) => {
                output::print_error(e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

/// Handles the `show` subcommand.
fn handle_show(file: &Path) -> miette::Result<bool> {
    let set = store::load(file)?;
    output::print_entries(&set).into_diagnostic()?;
    Ok(true)
}

/// Handles the `check` subcommand.
fn handle_check(dir: &Path) -> miette::Result<bool> {
    let files = discover_golden_files(dir);
    let mut failed = 0;
    for path in &files {
        if let Err(e) = store::load(path) {
            output::print_error(e);
            failed += 1;
        }
    }
    println!("checked {} snapshot files, {} failed", files.len(), failed);
    Ok(failed == 0)
}

/// Handles the `diff` subcommand.
fn handle_diff(expected: &Path, received: &Path) -> miette::Result<bool> {
    let expected_set = store::load(expected)?;
    let received_set = store::load(received)?;
    match first_difference(&expected_set, &received_set) {
        None => Ok(true),
        Some(Mismatch::Names(diff)) => {
            output::print_diff("snapshot names differ:", &diff).into_diagnostic()?;
            Ok(false)
        }
        Some(Mismatch::Values { name, diff }) => {
            output::print_diff(&format!("snapshot {name} differs:"), &diff).into_diagnostic()?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discovery_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("b.snapshots.json"), "[]").unwrap();
        fs::write(nested.join("a.snapshots.json"), "[]").unwrap();
        fs::write(tmp.path().join("notes.json"), "[]").unwrap();

        let found = discover_golden_files(tmp.path());
        assert_eq!(
            found,
            vec![
                tmp.path().join("b.snapshots.json"),
                nested.join("a.snapshots.json"),
            ]
        );
    }

    #[test]
    fn test_discovery_of_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_golden_files(&tmp.path().join("nope")).is_empty());
    }
}
