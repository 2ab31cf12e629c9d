//! Capabilities a host test context must provide.
//!
//! [`Toaster`] is the minimal contract every assertion primitive needs.
//! [`ExtendedToaster`] adds the optional pass-through operations; a
//! [`Toast`](crate::Toast) over a host that only implements [`Toaster`]
//! still has every assertion, it just lacks the pass-through methods.

use std::path::PathBuf;

use crate::error::Result;

/// Minimal host test context.
///
/// Methods take `&self`: hosts are owned by a single test and use interior
/// mutability for their bookkeeping.
pub trait Toaster {
    /// Record informational output. Never aborts.
    fn log(&self, message: &str);

    /// Mark the test failed and record why. Does not abort.
    fn record_failure(&self, message: &str);

    /// Stop the current test immediately.
    ///
    /// Hosts unwind (panic) here; nothing after the call runs.
    fn abort_now(&self) -> !;

    /// Whether a failure has been recorded so far.
    fn has_failed(&self) -> bool;
}

/// Optional host capabilities forwarded by [`Toast`](crate::Toast).
///
/// Frame exclusion for location attribution is not a method here: mark
/// helper functions `#[track_caller]` instead.
pub trait ExtendedToaster: Toaster {
    /// Name of the running test.
    fn name(&self) -> String;

    /// Register `f` to run when the test finishes, whatever the outcome.
    /// Cleanups run in reverse registration order.
    fn cleanup(&self, f: Box<dyn FnOnce()>);

    /// Stop the test and report it as skipped rather than failed.
    fn skip_now(&self) -> !;

    /// Whether the test has been skipped.
    fn skipped(&self) -> bool;

    /// Set an environment variable for the rest of the test, restoring the
    /// previous value at cleanup.
    fn set_env(&self, key: &str, value: &str);

    /// A scratch directory owned by the test, removed when it finishes.
    fn temp_dir(&self) -> Result<PathBuf>;

    /// Log `message` then skip.
    fn skip(&self, message: &str) -> ! {
        self.log(message);
        self.skip_now()
    }

    /// Record `message` as a failure then abort.
    fn fatal(&self, message: &str) -> ! {
        self.record_failure(message);
        self.abort_now()
    }
}

impl<H: Toaster + ?Sized> Toaster for &H {
    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn record_failure(&self, message: &str) {
        (**self).record_failure(message)
    }

    fn abort_now(&self) -> ! {
        (**self).abort_now()
    }

    fn has_failed(&self) -> bool {
        (**self).has_failed()
    }
}
