//! The default path: `Snapshotter::new` with a `ThreadContext`, the process
//! configuration and the golden file named after the libtest thread.
//!
//! Golden files for these tests live in the crate-level `testdata/`
//! directory, the default `SNAPSHOT_DIR`.

use snapshotter::{Mode, Snapshotter, ThreadContext};

#[test]
#[should_panic(expected = "testdata/missing_golden_file_panics_on_drop.snapshots.json")]
fn missing_golden_file_panics_on_drop() {
    let ctx = ThreadContext::new();
    let mut snap = Snapshotter::new(&ctx);
    if snap.mode() == Mode::Rewrite {
        panic!(
            "testdata/missing_golden_file_panics_on_drop.snapshots.json \
             would be created in rewrite mode"
        );
    }
    snap.snapshot("value", &1);
    snap.verify();
    assert_eq!(ctx.failure_count(), 1);
}

#[test]
fn thread_context_reads_default_golden_file() {
    let ctx = ThreadContext::new();
    let mut snap = Snapshotter::new(&ctx);
    assert!(snap
        .path()
        .ends_with("testdata/thread_context_reads_default_golden_file.snapshots.json"));
    snap.snapshot("greeting", "hello\nworld");
    snap.snapshot("answer", &42.0);
    snap.verify();
    assert_eq!(ctx.failure_count(), 0);
}
