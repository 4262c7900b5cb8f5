//! Process-level snapshot configuration.
//!
//! The environment is read once per process; each [`Snapshotter`](crate::Snapshotter)
//! receives a copy of the resulting [`SnapshotConfig`] at construction and
//! never consults the environment itself.
//!
//! | Variable            | Effect                                             |
//! |---------------------|----------------------------------------------------|
//! | `REWRITE_SNAPSHOTS` | `1`, `true`, `yes` or `on` switch to rewrite mode  |
//! | `SNAPSHOT_DIR`      | directory holding golden files (default `testdata`) |

use std::path::PathBuf;

use once_cell::sync::Lazy;

pub const REWRITE_ENV: &str = "REWRITE_SNAPSHOTS";
pub const DIR_ENV: &str = "SNAPSHOT_DIR";
pub const DEFAULT_DIR: &str = "testdata";

static PROCESS_CONFIG: Lazy<SnapshotConfig> = Lazy::new(|| {
    let config = SnapshotConfig::from_vars(
        std::env::var(REWRITE_ENV).ok().as_deref(),
        std::env::var(DIR_ENV).ok().as_deref(),
    );
    tracing::debug!(mode = %config.mode, dir = %config.dir.display(), "snapshot configuration");
    config
});

/// What [`Snapshotter::verify`](crate::Snapshotter::verify) does with the captured set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Compare against the golden file.
    #[default]
    Compare,
    /// Regenerate the golden file from the captured set.
    Rewrite,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Compare => "compare",
            Mode::Rewrite => "rewrite",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub mode: Mode,
    /// Directory holding golden files, relative to the test's working directory.
    pub dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Compare,
            dir: PathBuf::from(DEFAULT_DIR),
        }
    }
}

impl SnapshotConfig {
    pub fn new(mode: Mode, dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            dir: dir.into(),
        }
    }

    /// The process-wide configuration, read from the environment on first use.
    pub fn from_env() -> Self {
        PROCESS_CONFIG.clone()
    }

    /// Builds a configuration from raw variable values.
    pub fn from_vars(rewrite: Option<&str>, dir: Option<&str>) -> Self {
        let mode = match rewrite {
            Some(v) if is_truthy(v) => Mode::Rewrite,
            _ => Mode::Compare,
        };
        let dir = dir
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DIR);
        Self::new(mode, dir)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_rewrite(&self) -> bool {
        self.mode == Mode::Rewrite
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
