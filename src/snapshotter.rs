//! # Snapshotter
//!
//! Captures values during a test and, when the test finishes, either compares
//! them with the golden file or rewrites the golden file.
//!
//! A snapshotter lives in one of two states. While *capturing*,
//! [`Snapshotter::snapshot`] appends entries to an in-memory set.
//! [`Snapshotter::verify`] (or [`Snapshotter::check`]) consumes the
//! snapshotter, so it is *finalized* exactly once and cannot capture again.
//!
//! ## Compare mode
//!
//! 1. No golden file and nothing captured: nothing to do.
//! 2. Otherwise the golden file is loaded and the sequence of entry names is
//!    compared first; any difference is a structural mismatch.
//! 3. Entries are then compared position by position. The first entry that
//!    differs is reported and comparison stops there.
//!
//! ## Rewrite mode
//!
//! The golden file is replaced by the captured set. Capturing nothing removes
//! a stale golden file.

use std::panic::Location;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::config::{Mode, SnapshotConfig};
use crate::context::TestContext;
use crate::diff::{diff_rendered, diff_values, Diff};
use crate::errors::{SnapshotError, SnapshotResult};
use crate::store::{self, snapshot_path, SnapshotEntry, SnapshotSet};
use crate::value::{normalize, SnapshotValue};

/// Result of a successful finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Compare mode: the captured set matched the golden file.
    Matched,
    /// Rewrite mode: the golden file was written.
    Written,
    /// Rewrite mode: nothing was captured and the stale golden file was removed.
    Removed,
    /// Nothing captured and no golden file present.
    Unchanged,
}

pub struct Snapshotter<C: TestContext> {
    ctx: C,
    name: String,
    config: SnapshotConfig,
    snapshots: SnapshotSet,
    finalized: bool,
}

impl<C: TestContext> Snapshotter<C> {
    /// Creates a snapshotter using the process-wide configuration.
    pub fn new(ctx: C) -> Self {
        Self::with_config(ctx, "", SnapshotConfig::from_env())
    }

    /// Creates a snapshotter whose golden file carries a discriminator, for
    /// tests that keep more than one snapshot set.
    pub fn named(ctx: C, name: impl Into<String>) -> Self {
        Self::with_config(ctx, name, SnapshotConfig::from_env())
    }

    pub fn with_config(ctx: C, name: impl Into<String>, config: SnapshotConfig) -> Self {
        Self {
            ctx,
            name: name.into(),
            config,
            snapshots: SnapshotSet::new(),
            finalized: false,
        }
    }

    /// Records one value under `name`.
    ///
    /// A value that cannot round-trip through JSON is reported and the entry
    /// is dropped; the test keeps running.
    #[track_caller]
    pub fn snapshot<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        self.ctx.helper(Location::caller());
        if let Some(normalized) = self.normalize_or_report(name, value) {
            self.snapshots.push(SnapshotEntry::new(name, vec![normalized]));
        }
    }

    /// Records several values together under `name`. All or nothing: if any
    /// value fails to normalize, no entry is added.
    ///
    /// The [`snapshot!`](crate::snapshot!) macro is the shorthand for this.
    #[track_caller]
    pub fn snapshot_values(&mut self, name: &str, values: &[&dyn SnapshotValue]) {
        self.ctx.helper(Location::caller());
        let mut normalized = Vec::with_capacity(values.len());
        for value in values {
            match self.normalize_or_report(name, *value) {
                Some(v) => normalized.push(v),
                None => return,
            }
        }
        self.snapshots.push(SnapshotEntry::new(name, normalized));
    }

    /// Finishes the test: compares or rewrites, and reports any failure
    /// through the test context.
    #[track_caller]
    pub fn verify(mut self) {
        self.ctx.helper(Location::caller());
        self.finalized = true;
        if let Err(err) = self.finalize() {
            self.ctx.report_failure(&err.to_string());
        }
    }

    /// Like [`verify`](Self::verify) but hands the error back instead of
    /// reporting it.
    pub fn check(mut self) -> SnapshotResult<Outcome> {
        self.finalized = true;
        self.finalize()
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        self.snapshots.entries()
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Path of the golden file for this test and discriminator.
    pub fn path(&self) -> PathBuf {
        snapshot_path(&self.config.dir, &self.ctx.test_name(), &self.name)
    }

    fn normalize_or_report<V>(&self, name: &str, value: &V) -> Option<Value>
    where
        V: SnapshotValue + ?Sized,
    {
        match normalize(value) {
            Ok(v) => Some(v),
            Err(source) => {
                let err = SnapshotError::Serialization {
                    name: name.to_string(),
                    value: value.describe(),
                    source,
                };
                self.ctx.report_failure(&err.to_string());
                None
            }
        }
    }

    fn finalize(&self) -> SnapshotResult<Outcome> {
        let path = self.path();
        tracing::debug!(
            mode = %self.config.mode,
            path = %path.display(),
            entries = self.snapshots.len(),
            "verifying snapshots"
        );
        match self.config.mode {
            Mode::Rewrite => self.rewrite(&path),
            Mode::Compare => self.compare(&path),
        }
    }

    fn rewrite(&self, path: &Path) -> SnapshotResult<Outcome> {
        // Nothing captured means the snapshots are gone; drop the stale file.
        if self.snapshots.is_empty() {
            return Ok(if store::remove(path)? {
                Outcome::Removed
            } else {
                Outcome::Unchanged
            });
        }
        store::save(path, &self.snapshots)?;
        Ok(Outcome::Written)
    }

    fn compare(&self, path: &Path) -> SnapshotResult<Outcome> {
        if self.snapshots.is_empty() && !store::exists(path) {
            return Ok(Outcome::Unchanged);
        }
        let expected = store::load(path)?;
        compare_sets(&expected, &self.snapshots)?;
        Ok(Outcome::Matched)
    }
}

impl<C: TestContext> Drop for Snapshotter<C> {
    fn drop(&mut self) {
        if !self.finalized && !self.snapshots.is_empty() {
            tracing::warn!(
                test = %self.ctx.test_name(),
                entries = self.snapshots.len(),
                "snapshotter dropped without verify; captured snapshots were not checked"
            );
        }
    }
}

/// The first difference between two snapshot sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The entry name sequences differ.
    Names(Diff),
    /// Entry `name` holds different values.
    Values { name: String, diff: Diff },
}

impl From<Mismatch> for SnapshotError {
    fn from(mismatch: Mismatch) -> Self {
        match mismatch {
            Mismatch::Names(diff) => SnapshotError::StructuralMismatch {
                diff: diff.to_string(),
            },
            Mismatch::Values { name, diff } => SnapshotError::ValueMismatch {
                name,
                diff: diff.to_string(),
            },
        }
    }
}

/// Finds the first difference the way compare mode does: entry names first,
/// then entry values in order.
///
/// Only the first differing entry is returned; later entries are not looked at.
pub fn first_difference(expected: &SnapshotSet, actual: &SnapshotSet) -> Option<Mismatch> {
    let names = diff_rendered(&expected.names(), &actual.names());
    if !names.is_empty() {
        return Some(Mismatch::Names(names));
    }

    expected
        .entries()
        .iter()
        .zip(actual.entries())
        .find_map(|(expected, actual)| {
            let diff = diff_values(&expected.values, &actual.values);
            (!diff.is_empty()).then(|| Mismatch::Values {
                name: actual.name.clone(),
                diff,
            })
        })
}

pub fn compare_sets(expected: &SnapshotSet, actual: &SnapshotSet) -> SnapshotResult<()> {
    match first_difference(expected, actual) {
        Some(mismatch) => Err(mismatch.into()),
        None => Ok(()),
    }
}

/// Captures several values of possibly different types in one entry.
///
/// ```rust,no_run
/// use snapshotter::{snapshot, Snapshotter, ThreadContext};
///
/// let ctx = ThreadContext::new();
/// let mut snap = Snapshotter::new(&ctx);
/// snapshot!(snap, "request", "GET", 200, vec!["a", "b"]);
/// snap.verify();
/// ```
#[macro_export]
macro_rules! snapshot {
    ($snap:expr, $name:expr, $($value:expr),+ $(,)?) => {
        $snap.snapshot_values($name, &[$(&$value as &dyn $crate::SnapshotValue),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordingContext;
    use crate::errors::ErrorClass;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn config(tmp: &TempDir, mode: Mode) -> SnapshotConfig {
        SnapshotConfig::new(mode, tmp.path().join("testdata"))
    }

    fn set(entries: &[(&str, Value)]) -> SnapshotSet {
        entries
            .iter()
            .map(|(name, value)| SnapshotEntry::new(*name, vec![value.clone()]))
            .collect()
    }

    #[test]
    fn test_failed_value_drops_whole_entry() {
        let tmp = TempDir::new().unwrap();
        let ctx = RecordingContext::new("capture");
        let mut snap = Snapshotter::with_config(&ctx, "", config(&tmp, Mode::Compare));

        let mut bad = BTreeMap::new();
        bad.insert((1, 2), "no");
        snap.snapshot_values("mixed", &[&1, &bad, &"after"]);
        snap.snapshot("ok", "fine");

        assert_eq!(snap.entries().len(), 1);
        assert_eq!(snap.entries()[0].name, "ok");
        let failures = ctx.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("mixed: error roundtripping value of type"));
        let _ = snap.check();
    }

    #[test]
    fn test_macro_captures_heterogeneous_values() {
        let tmp = TempDir::new().unwrap();
        let ctx = RecordingContext::new("macro");
        let mut snap = Snapshotter::with_config(&ctx, "", config(&tmp, Mode::Rewrite));
        snapshot!(snap, "req", "GET", 200_u16, vec![1.5, 2.0]);
        assert_eq!(
            snap.entries()[0].values,
            vec![json!("GET"), json!(200), json!([1.5, 2])]
        );
        assert_eq!(snap.check().unwrap(), Outcome::Written);
    }

    #[test]
    fn test_helper_receives_call_site() {
        let tmp = TempDir::new().unwrap();
        let ctx = RecordingContext::new("caller");
        let mut snap = Snapshotter::with_config(&ctx, "", config(&tmp, Mode::Compare));
        snap.snapshot("x", &1);
        let line = line!() - 1;
        assert_eq!(ctx.caller().unwrap().line(), line);
        assert!(ctx.caller().unwrap().file().ends_with("snapshotter.rs"));
        let _ = snap.check();
    }

    #[test]
    fn test_compare_sets_names_before_values() {
        let expected = set(&[("a", json!(1)), ("b", json!(2))]);
        let actual = set(&[("b", json!(2)), ("a", json!(1))]);
        let err = compare_sets(&expected, &actual).unwrap_err();
        assert_eq!(err.class(), ErrorClass::StructuralMismatch);
    }

    #[test]
    fn test_compare_sets_stops_at_first_difference() {
        let expected = set(&[("e1", json!(1)), ("e2", json!(2))]);
        let actual = set(&[("e1", json!(10)), ("e2", json!(20))]);
        match compare_sets(&expected, &actual).unwrap_err() {
            SnapshotError::ValueMismatch { name, diff } => {
                assert_eq!(name, "e1");
                assert!(diff.contains("-  1\n"));
                assert!(!diff.contains("20"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_difference_keeps_structured_diff() {
        let expected = set(&[("only", json!({"a": 1}))]);
        let actual = set(&[("only", json!({"a": 2}))]);
        match first_difference(&expected, &actual) {
            Some(Mismatch::Values { name, diff }) => {
                assert_eq!(name, "only");
                assert_eq!(diff.hunks().len(), 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(first_difference(&expected, &expected), None);
    }

    #[test]
    fn test_path_uses_context_name_and_discriminator() {
        let tmp = TempDir::new().unwrap();
        let ctx = RecordingContext::new("render::tests::page");
        let snap = Snapshotter::with_config(&ctx, "dark/mode", config(&tmp, Mode::Compare));
        assert_eq!(
            snap.path(),
            tmp.path()
                .join("testdata")
                .join("render--tests--page_dark-mode.snapshots.json")
        );
        assert_eq!(snap.check().unwrap(), Outcome::Unchanged);
    }
}
