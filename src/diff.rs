//! Unified diffs between expected and received snapshot renderings.
//!
//! Line matching comes from the `difference` crate; this module groups the
//! resulting changes into unified-diff hunks with one line of context,
//! labeled `expected` and `received`.
//!
//! Two rendering policies are used, depending on what is being compared:
//!
//! - a single string on both sides is diffed line by line as raw text, so
//!   rendered templates and other multi-line strings diff cleanly;
//! - everything else is pretty-printed as two-space indented JSON first.

use std::fmt;
use std::io;

use difference::{Changeset, Difference};
use serde::Serialize;
use serde_json::Value;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::value::single_string;

/// Lines of unchanged context around each change.
pub const CONTEXT: usize = 1;

const FROM_LABEL: &str = "expected";
const TO_LABEL: &str = "received";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Same,
    Removed,
    Added,
}

impl LineTag {
    fn prefix(self) -> char {
        match self {
            LineTag::Same => ' ',
            LineTag::Removed => '-',
            LineTag::Added => '+',
        }
    }
}

/// One line of a diff, with its zero-based position on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: LineTag,
    pub text: String,
    old_pos: usize,
    new_pos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_len),
            format_range(self.new_start, self.new_len)
        )
    }
}

/// A unified diff. Displays as the empty string when there is no difference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    hunks: Vec<Hunk>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// Writes the diff with removals in red and additions in green.
    pub fn print_colored<W: WriteColor>(&self, out: &mut W) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "--- {FROM_LABEL}")?;
        writeln!(out, "+++ {TO_LABEL}")?;
        for hunk in &self.hunks {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            writeln!(out, "{}", hunk.header())?;
            for line in &hunk.lines {
                match line.tag {
                    LineTag::Same => out.reset()?,
                    LineTag::Removed => out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?,
                    LineTag::Added => out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?,
                }
                writeln!(out, "{}{}", line.tag.prefix(), line.text)?;
            }
        }
        out.reset()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f, "--- {FROM_LABEL}")?;
        writeln!(f, "+++ {TO_LABEL}")?;
        for hunk in &self.hunks {
            writeln!(f, "{}", hunk.header())?;
            for line in &hunk.lines {
                writeln!(f, "{}{}", line.tag.prefix(), line.text)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Diffs two texts line by line.
///
/// # Examples
///
/// ```rust
/// use snapshotter::diff::diff_text;
/// assert!(diff_text("same", "same").is_empty());
/// let d = diff_text("a\nb\nc", "a\nB\nc").to_string();
/// assert_eq!(d, "--- expected\n+++ received\n@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n");
/// ```
pub fn diff_text(expected: &str, actual: &str) -> Diff {
    if expected == actual {
        return Diff::default();
    }
    let changeset = Changeset::new(expected, actual, "\n");
    Diff {
        hunks: group_hunks(flatten(&changeset.diffs)),
    }
}

/// Diffs two value lists, as stored in one snapshot entry.
///
/// When each side is exactly one string the raw strings are diffed,
/// otherwise both sides are pretty-printed first.
pub fn diff_values(expected: &[Value], actual: &[Value]) -> Diff {
    if let (Some(expected), Some(actual)) = (single_string(expected), single_string(actual)) {
        return diff_text(expected, actual);
    }
    diff_rendered(expected, actual)
}

/// Diffs the pretty-printed renderings of two serializable values.
pub fn diff_rendered<T: Serialize + ?Sized>(expected: &T, actual: &T) -> Diff {
    diff_text(&render(expected), &render(actual))
}

/// Structure-aware rendering: two-space indented JSON.
pub fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("<unrenderable value: {e}>"))
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn flatten(diffs: &[Difference]) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    let (mut old_pos, mut new_pos) = (0, 0);
    for diff in diffs {
        let (tag, chunk) = match diff {
            Difference::Same(ref x) => (LineTag::Same, x),
            Difference::Rem(ref x) => (LineTag::Removed, x),
            Difference::Add(ref x) => (LineTag::Added, x),
        };
        for text in chunk.split('\n') {
            lines.push(DiffLine {
                tag,
                text: text.to_string(),
                old_pos,
                new_pos,
            });
            match tag {
                LineTag::Same => {
                    old_pos += 1;
                    new_pos += 1;
                }
                LineTag::Removed => old_pos += 1,
                LineTag::Added => new_pos += 1,
            }
        }
    }
    lines
}

fn group_hunks(lines: Vec<DiffLine>) -> Vec<Hunk> {
    let changed: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.tag != LineTag::Same)
        .map(|(i, _)| i)
        .collect();

    // Inclusive index ranges, merged when their context touches.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for i in changed {
        let start = i.saturating_sub(CONTEXT);
        let end = (i + CONTEXT).min(lines.len() - 1);
        match ranges.last_mut() {
            Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
            _ => ranges.push((start, end)),
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            let slice = &lines[start..=end];
            let old_len = slice.iter().filter(|l| l.tag != LineTag::Added).count();
            let new_len = slice.iter().filter(|l| l.tag != LineTag::Removed).count();
            Hunk {
                old_start: slice[0].old_pos,
                old_len,
                new_start: slice[0].new_pos,
                new_len,
                lines: slice.to_vec(),
            }
        })
        .collect()
}

/// Formats a hunk range the way `diff -u` does: one-based, length omitted
/// when it is 1, and an empty range anchored on the preceding line.
fn format_range(start: usize, len: usize) -> String {
    match len {
        1 => format!("{}", start + 1),
        0 => format!("{},0", start),
        _ => format!("{},{}", start + 1, len),
    }
}
