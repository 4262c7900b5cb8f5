//! Golden-file snapshot assertions.
//!
//! ```rust,no_run
//! use snapshotter::{Snapshotter, ThreadContext};
//!
//! #[derive(serde::Serialize)]
//! struct Page { title: String, links: Vec<String> }
//!
//! let ctx = ThreadContext::new();
//! let mut snap = Snapshotter::new(&ctx);
//! snap.snapshot("page", &Page { title: "Home".into(), links: vec![] });
//! snap.snapshot("html", "<h1>Home</h1>");
//! snap.verify();
//! ```
//!
//! Run the tests with `REWRITE_SNAPSHOTS=1` to (re)generate the golden files
//! under `testdata/`.

pub use crate::config::{Mode, SnapshotConfig};
pub use crate::context::{RecordingContext, TestContext, ThreadContext};
pub use crate::errors::{ErrorClass, SnapshotError, SnapshotResult};
pub use crate::snapshotter::{compare_sets, first_difference, Mismatch, Outcome, Snapshotter};
pub use crate::store::{SnapshotEntry, SnapshotSet};
pub use crate::value::SnapshotValue;

pub mod cli;
pub mod config;
pub mod context;
pub mod diff;
pub mod errors;
pub mod snapshotter;
pub mod store;
pub mod value;
