//! The test-runner collaborator.
//!
//! A [`Snapshotter`](crate::Snapshotter) needs three things from whatever runs
//! the test: a stable identifier for the test, a way to report a failure
//! without stopping, and a way to learn which call site to blame. That is the
//! whole of [`TestContext`].

use std::cell::RefCell;
use std::panic::Location;

/// Identifier used when the current thread has no name.
pub const UNNAMED_TEST: &str = "unnamed";

pub trait TestContext {
    /// Stable identifier of the running test. Drives the golden file name.
    fn test_name(&self) -> String;

    /// Records a failure. Must not stop the test by itself.
    fn report_failure(&self, message: &str);

    /// Marks `caller` as the location failures should be attributed to.
    fn helper(&self, _caller: &'static Location<'static>) {}
}

impl<C: TestContext + ?Sized> TestContext for &C {
    fn test_name(&self) -> String {
        (**self).test_name()
    }

    fn report_failure(&self, message: &str) {
        (**self).report_failure(message)
    }

    fn helper(&self, caller: &'static Location<'static>) {
        (**self).helper(caller)
    }
}

// ============================================================================
// THREAD CONTEXT: libtest integration
// ============================================================================

/// Context for the standard Rust test harness.
///
/// libtest runs each test on a thread named after the test path
/// (`module::tests::name`), which becomes the test identifier. Failures are
/// buffered and raised as a single panic when the context is dropped, so
/// every report of a test is visible at once.
///
/// ```rust,no_run
/// use snapshotter::{Snapshotter, ThreadContext};
///
/// let ctx = ThreadContext::new();
/// let mut snap = Snapshotter::new(&ctx);
/// snap.snapshot("answer", &42);
/// snap.verify();
/// ```
#[derive(Debug, Default)]
pub struct ThreadContext {
    failures: RefCell<Vec<String>>,
    caller: RefCell<Option<&'static Location<'static>>>,
}

impl ThreadContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures reported so far.
    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }
}

impl TestContext for ThreadContext {
    fn test_name(&self) -> String {
        std::thread::current()
            .name()
            .unwrap_or(UNNAMED_TEST)
            .to_string()
    }

    fn report_failure(&self, message: &str) {
        self.failures.borrow_mut().push(message.to_string());
    }

    fn helper(&self, caller: &'static Location<'static>) {
        *self.caller.borrow_mut() = Some(caller);
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        let failures = self.failures.get_mut();
        if failures.is_empty() || std::thread::panicking() {
            return;
        }
        let joined = failures.join("\n");
        match *self.caller.get_mut() {
            Some(caller) => panic!("{caller}: {joined}"),
            None => panic!("{joined}"),
        }
    }
}

// ============================================================================
// RECORDING CONTEXT: inspection in tests
// ============================================================================

/// Context with a fixed name that only records failures.
///
/// Useful for testing code that wraps a snapshotter, and used throughout this
/// crate's own tests.
#[derive(Debug)]
pub struct RecordingContext {
    name: String,
    failures: RefCell<Vec<String>>,
    caller: RefCell<Option<&'static Location<'static>>>,
}

impl RecordingContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: RefCell::new(Vec::new()),
            caller: RefCell::new(None),
        }
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.borrow().clone()
    }

    pub fn passed(&self) -> bool {
        self.failures.borrow().is_empty()
    }

    /// The location last passed to [`TestContext::helper`].
    pub fn caller(&self) -> Option<&'static Location<'static>> {
        *self.caller.borrow()
    }
}

impl TestContext for RecordingContext {
    fn test_name(&self) -> String {
        self.name.clone()
    }

    fn report_failure(&self, message: &str) {
        self.failures.borrow_mut().push(message.to_string());
    }

    fn helper(&self, caller: &'static Location<'static>) {
        *self.caller.borrow_mut() = Some(caller);
    }
}
