//! Snapshot sets and their golden files.
//!
//! A golden file is a pretty-printed JSON array of `{"name", "values"}`
//! records, one per captured entry, in capture order:
//!
//! ```json
//! [
//!   {
//!     "name": "greeting",
//!     "values": [
//!       "hello"
//!     ]
//!   }
//! ]
//! ```
//!
//! Files live under a snapshot directory (`testdata` by default) and are
//! named after the test, see [`snapshot_path`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{SnapshotError, SnapshotResult};
use crate::value::canonicalize;

/// File name suffix of every golden file.
pub const SNAPSHOT_SUFFIX: &str = ".snapshots.json";

/// One capture call: a name and the normalized values captured with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl SnapshotEntry {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered entries of one snapshotter; insertion order is capture order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotSet {
    entries: Vec<SnapshotEntry>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SnapshotEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in capture order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Encodes the set as two-space indented JSON with a trailing newline.
    pub fn to_json(&self) -> SnapshotResult<String> {
        let mut text = serde_json::to_string_pretty(self)
            .map_err(|source| SnapshotError::Encode { source })?;
        text.push('\n');
        Ok(text)
    }

    /// Decodes a golden file's contents. `path` is only used for error context.
    pub fn from_json(text: &str, path: &Path) -> SnapshotResult<Self> {
        let mut set: SnapshotSet =
            serde_json::from_str(text).map_err(|source| SnapshotError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        for entry in &mut set.entries {
            let values = std::mem::take(&mut entry.values);
            entry.values = values.into_iter().map(canonicalize).collect();
        }
        Ok(set)
    }
}

impl FromIterator<SnapshotEntry> for SnapshotSet {
    fn from_iter<I: IntoIterator<Item = SnapshotEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// NAMING
// ============================================================================

/// Replaces the characters that are unsafe in file names (`/` and `:`) with `-`.
pub fn sanitize(name: &str) -> String {
    name.replace(['/', ':'], "-")
}

/// Derives the golden file path for a test and an optional discriminator.
///
/// # Examples
///
/// ```rust
/// use snapshotter::store::snapshot_path;
/// use std::path::Path;
///
/// let p = snapshot_path(Path::new("testdata"), "render::tests::page", "dark:mode");
/// assert_eq!(p, Path::new("testdata/render--tests--page_dark-mode.snapshots.json"));
///
/// let p = snapshot_path(Path::new("testdata"), "TestPage/sub", "");
/// assert_eq!(p, Path::new("testdata/TestPage-sub.snapshots.json"));
/// ```
pub fn snapshot_path(dir: &Path, test_id: &str, discriminator: &str) -> PathBuf {
    let mut file_name = sanitize(test_id);
    if !discriminator.is_empty() {
        file_name.push('_');
        file_name.push_str(&sanitize(discriminator));
    }
    file_name.push_str(SNAPSHOT_SUFFIX);
    dir.join(file_name)
}

// ============================================================================
// STORAGE
// ============================================================================

pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Reads and decodes a golden file.
pub fn load(path: &Path) -> SnapshotResult<SnapshotSet> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SnapshotError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    SnapshotSet::from_json(&text, path)
}

/// Encodes `set` and writes it to `path`, creating the parent directory
/// when needed. Overwrites any previous content.
pub fn save(path: &Path, set: &SnapshotSet) -> SnapshotResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| SnapshotError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let text = set.to_json()?;
    fs::write(path, text).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), entries = set.len(), "wrote snapshot file");
    Ok(())
}

/// Removes a golden file. Returns `Ok(false)` when there was nothing to remove.
pub fn remove(path: &Path) -> SnapshotResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed snapshot file");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SnapshotError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorClass;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> SnapshotSet {
        [
            SnapshotEntry::new("greeting", vec![json!("hello")]),
            SnapshotEntry::new("pair", vec![json!(1), json!({"k": [true, null]})]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a/b:c::d"), "a-b-c--d");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn test_discriminators_give_distinct_paths() {
        let dir = Path::new("testdata");
        let a = snapshot_path(dir, "mod::test", "first");
        let b = snapshot_path(dir, "mod::test", "second");
        let plain = snapshot_path(dir, "mod::test", "");
        assert_ne!(a, b);
        assert_ne!(a, plain);
        assert_eq!(plain, Path::new("testdata/mod--test.snapshots.json"));
    }

    #[test]
    fn test_json_layout() {
        let text = sample().to_json().unwrap();
        assert!(text.starts_with("[\n  {\n    \"name\": \"greeting\",\n    \"values\": [\n      \"hello\"\n"));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn test_save_creates_dir_and_load_reads_back() {
        let tmp = TempDir::new().unwrap();
        let path = snapshot_path(&tmp.path().join("nested/testdata"), "t", "");
        save(&path, &sample()).unwrap();
        assert!(exists(&path));
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load(&tmp.path().join("missing.snapshots.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound { .. }));
        assert_eq!(err.class(), ErrorClass::Io);
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.snapshots.json");
        fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        let err = load(&path).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Decode);
    }

    #[test]
    fn test_decoded_floats_are_canonical() {
        let set = SnapshotSet::from_json(
            r#"[{"name": "n", "values": [1.0, 2.5]}, {"name": "empty"}]"#,
            Path::new("inline"),
        )
        .unwrap();
        assert_eq!(set.entries()[0].values, vec![json!(1), json!(2.5)]);
        assert!(set.entries()[1].values.is_empty());
        assert_eq!(set.names(), vec!["n", "empty"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.snapshots.json");
        fs::write(&path, "[]").unwrap();
        assert!(remove(&path).unwrap());
        assert!(!remove(&path).unwrap());
        assert!(!exists(&path));
    }
}
