//! A host test context for the standard `#[test]` harness.
//!
//! libtest has no notion of "failed but keep going", so `LibtestHost`
//! keeps its own record: failures are collected as they happen and the
//! test is failed (by panicking) when the host is dropped. `abort_now`
//! panics straight away.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;
use crate::message::payload_text;
use crate::toaster::{ExtendedToaster, Toaster};

/// Unwind payload used by [`ExtendedToaster::skip_now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skipped;

/// Host context for a single `#[test]` function.
///
/// Create one at the top of the test and let it drop at the end:
///
/// ```
/// use toast::{LibtestHost, Toast};
///
/// let host = LibtestHost::new();
/// let t = Toast::new(&host);
/// t.assert(true, &[]);
/// // `host` drops here: cleanups run, recorded failures fail the test.
/// ```
pub struct LibtestHost {
    name: String,
    failures: RefCell<Vec<String>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    skipped: Cell<bool>,
    temp_dir: RefCell<Option<TempDir>>,
}

impl LibtestHost {
    /// Host named after the current thread, which libtest sets to the test path.
    pub fn new() -> Self {
        let name = thread::current().name().unwrap_or("unnamed").to_string();
        Self::named(name)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            skipped: Cell::new(false),
            temp_dir: RefCell::new(None),
        }
    }

    /// Run `f` against a fresh host, treating a skip as success.
    ///
    /// Any other panic keeps unwinding, and recorded failures still fail
    /// the test when the host drops.
    pub fn run<F: FnOnce(&LibtestHost)>(f: F) {
        let host = LibtestHost::new();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(&host))) {
            if payload.downcast_ref::<Skipped>().is_none() {
                // `host` drops while unwinding, so it will not panic again.
                panic::resume_unwind(payload);
            }
        }
    }

    /// Failures recorded so far.
    pub fn failures(&self) -> Vec<String> {
        self.failures.borrow().clone()
    }

    fn run_cleanups(&self) {
        loop {
            // Pop before calling so a cleanup may register another.
            let next = self.cleanups.borrow_mut().pop();
            let Some(cleanup) = next else {
                break;
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(cleanup)) {
                let text = payload_text(payload.as_ref())
                    .unwrap_or_else(|| "<non-string payload>".to_string());
                self.record_failure(&format!("cleanup panicked: {}", text));
            }
        }
    }

    fn summary(&self) -> String {
        let failures = self.failures.borrow();
        format!(
            "{}: {} failure(s)\n{}",
            self.name,
            failures.len(),
            failures.join("\n")
        )
    }
}

impl Default for LibtestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Toaster for LibtestHost {
    fn log(&self, message: &str) {
        debug!(test = %self.name, "{}", message);
        eprintln!("{}", message);
    }

    fn record_failure(&self, message: &str) {
        warn!(test = %self.name, "{}", message);
        eprintln!("{}", message);
        self.failures.borrow_mut().push(message.to_string());
    }

    fn abort_now(&self) -> ! {
        panic!("{}", self.summary())
    }

    fn has_failed(&self) -> bool {
        !self.failures.borrow().is_empty()
    }
}

impl ExtendedToaster for LibtestHost {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn cleanup(&self, f: Box<dyn FnOnce()>) {
        self.cleanups.borrow_mut().push(f);
    }

    fn skip_now(&self) -> ! {
        self.skipped.set(true);
        debug!(test = %self.name, "skipped");
        panic::resume_unwind(Box::new(Skipped))
    }

    fn skipped(&self) -> bool {
        self.skipped.get()
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        std::env::set_var(key, value);

        let key = key.to_string();
        self.cleanup(Box::new(move || match previous {
            Some(value) => std::env::set_var(&key, value),
            None => std::env::remove_var(&key),
        }));
    }

    fn temp_dir(&self) -> Result<PathBuf> {
        let mut slot = self.temp_dir.borrow_mut();
        if let Some(dir) = slot.as_ref() {
            return Ok(dir.path().to_path_buf());
        }
        let dir = tempfile::Builder::new().prefix("toast-").tempdir()?;
        let path = dir.path().to_path_buf();
        *slot = Some(dir);
        Ok(path)
    }
}

impl Drop for LibtestHost {
    fn drop(&mut self) {
        self.run_cleanups();
        self.temp_dir.get_mut().take();

        if self.has_failed() && !thread::panicking() {
            panic!("{}", self.summary());
        }
    }
}
