//! Defines the command-line arguments and subcommands for the snapshotter CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "snapshotter",
    version,
    about = "Inspect, validate and compare golden snapshot files."
)]
pub struct SnapshotterArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List golden files and the entries they hold.
    List {
        /// Directory to search for golden files.
        #[arg(default_value = "testdata")]
        dir: PathBuf,
    },
    /// Print the entries of one golden file.
    Show {
        /// The golden file to print.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Decode every golden file and report the ones that are broken.
    Check {
        /// Directory to search for golden files.
        #[arg(default_value = "testdata")]
        dir: PathBuf,
    },
    /// Compare two golden files the way a test run in compare mode would.
    Diff {
        /// The golden file holding the expected snapshots.
        #[arg(required = true)]
        expected: PathBuf,
        /// The golden file holding the received snapshots.
        #[arg(required = true)]
        received: PathBuf,
    },
}
