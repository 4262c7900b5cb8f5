//! Handles all user-facing output for the CLI.
//!
//! Colorized diffs, entry listings and miette error reports all go through
//! here so every command prints the same way.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diff::{render, Diff};
use crate::errors::SnapshotError;
use crate::store::SnapshotSet;
use crate::value::single_string;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints a golden file path followed by its entry names.
pub fn print_listing(path: &Path, set: &SnapshotSet) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    stdout.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(stdout, "{}", path.display())?;
    stdout.reset()?;
    for entry in set.entries() {
        let noun = if entry.values.len() == 1 { "value" } else { "values" };
        writeln!(stdout, "  - {} ({} {})", entry.name, entry.values.len(), noun)?;
    }
    Ok(())
}

/// Prints every entry of a set. Single-string entries are printed raw.
pub fn print_entries(set: &SnapshotSet) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    for entry in set.entries() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        writeln!(stdout, "--- {} ---", entry.name)?;
        stdout.reset()?;
        match single_string(&entry.values) {
            Some(text) => writeln!(stdout, "{text}")?,
            None => writeln!(stdout, "{}", render(&entry.values))?,
        }
    }
    Ok(())
}

/// Prints a heading and a colorized diff to stdout.
pub fn print_diff(heading: &str, diff: &Diff) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    writeln!(stdout, "{heading}")?;
    stdout.reset()?;
    diff.print_colored(&mut stdout)
}

/// Colors only when stdout is a terminal, so piped output stays plain.
fn color_choice() -> ColorChoice {
    if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Prints a SnapshotError with full miette diagnostics.
pub fn print_error(error: SnapshotError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
