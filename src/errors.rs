//! Snapshot error taxonomy.
//!
//! Every failure the library can hit is a [`SnapshotError`]. Errors never
//! escape as panics: the [`Snapshotter`](crate::Snapshotter) hands them to the
//! test context as a formatted report and stops the current call.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Hint appended to every comparison failure.
pub const REWRITE_HINT: &str =
    "If this is intentional, rerun the test with `REWRITE_SNAPSHOTS=1` to generate new snapshots.";

/// Type-safe classification of a [`SnapshotError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// A captured value could not round-trip through JSON.
    Serialization,
    /// Storage I/O: reading, writing, creating or removing files.
    Io,
    /// The snapshot set could not be encoded.
    Encode,
    /// The golden file is not valid snapshot JSON.
    Decode,
    /// The sequence of entry names differs from the golden file.
    StructuralMismatch,
    /// An entry's values differ from the golden file.
    ValueMismatch,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Serialization => "Serialization",
            ErrorClass::Io => "Io",
            ErrorClass::Encode => "Encode",
            ErrorClass::Decode => "Decode",
            ErrorClass::StructuralMismatch => "StructuralMismatch",
            ErrorClass::ValueMismatch => "ValueMismatch",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum SnapshotError {
    #[error("{name}: error roundtripping value {value}: {source}")]
    #[diagnostic(
        code(snapshotter::serialization),
        help("snapshot values must serialize to JSON; maps need string keys")
    )]
    Serialization {
        name: String,
        /// Debug-ish rendering of the offending value, best effort.
        value: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot file {} does not exist", .path.display())]
    #[diagnostic(
        code(snapshotter::io::not_found),
        help("run the test with REWRITE_SNAPSHOTS=1 to record it")
    )]
    NotFound { path: PathBuf },

    #[error("error reading snapshots from {}: {source}", .path.display())]
    #[diagnostic(code(snapshotter::io::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing snapshots to {}: {source}", .path.display())]
    #[diagnostic(code(snapshotter::io::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error creating snapshot directory {}: {source}", .path.display())]
    #[diagnostic(code(snapshotter::io::create_dir))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove the existing snapshot file {}: {source}", .path.display())]
    #[diagnostic(code(snapshotter::io::remove))]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error marshaling snapshots: {source}")]
    #[diagnostic(code(snapshotter::encode))]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("error unmarshaling snapshots from {}: {source}", .path.display())]
    #[diagnostic(
        code(snapshotter::decode),
        help("golden files hold a JSON array of {{\"name\", \"values\"}} records")
    )]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot names differ:\n{diff}\n{}", REWRITE_HINT)]
    #[diagnostic(
        code(snapshotter::mismatch::names),
        help("rerun with REWRITE_SNAPSHOTS=1 to accept the new output")
    )]
    StructuralMismatch { diff: String },

    #[error("snapshot {name} differs:\n{diff}\n{}", REWRITE_HINT)]
    #[diagnostic(
        code(snapshotter::mismatch::values),
        help("rerun with REWRITE_SNAPSHOTS=1 to accept the new output")
    )]
    ValueMismatch { name: String, diff: String },
}

impl SnapshotError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SnapshotError::Serialization { .. } => ErrorClass::Serialization,
            SnapshotError::NotFound { .. }
            | SnapshotError::Read { .. }
            | SnapshotError::Write { .. }
            | SnapshotError::CreateDir { .. }
            | SnapshotError::Remove { .. } => ErrorClass::Io,
            SnapshotError::Encode { .. } => ErrorClass::Encode,
            SnapshotError::Decode { .. } => ErrorClass::Decode,
            SnapshotError::StructuralMismatch { .. } => ErrorClass::StructuralMismatch,
            SnapshotError::ValueMismatch { .. } => ErrorClass::ValueMismatch,
        }
    }

    /// True for the two comparison failures, as opposed to I/O or format trouble.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::StructuralMismatch | ErrorClass::ValueMismatch
        )
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
