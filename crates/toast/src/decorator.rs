//! The assertion decorator and lifecycle wrapper.

use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::chain::{chain_contains, chain_has_type, Maybe};
use crate::config::Config;
use crate::error::Result;
use crate::location::LocationProvider;
use crate::message::{format_message, payload_text, ASSERT_FAILED};
use crate::toaster::{ExtendedToaster, Toaster};

const EXPECTED_PANIC: &str = "expected a panic";

/// Assertion helpers layered over a host test context.
///
/// A `Toast` borrows its host for the length of one test. Each failing
/// primitive records a diagnostic through the host and then, if
/// [`fail_fast`](Self::fail_fast) is set, aborts the test. The flag is read
/// on every call, so a test can relax it halfway through.
///
/// ```
/// use toast::{LibtestHost, Toast};
///
/// let host = LibtestHost::new();
/// let t = Toast::new(&host);
/// t.assert(1 + 1 == 2, &[&"arithmetic still works"]);
/// let n: i32 = t.check_err("42".parse::<i32>()).unwrap_or_default();
/// t.assert_eq(n, 42, &[]);
/// ```
pub struct Toast<'a, H: Toaster + ?Sized> {
    host: &'a H,
    /// Abort right after recording a failure.
    pub fail_fast: bool,
    locator: Box<dyn LocationProvider>,
    self_test: bool,
}

impl<'a, H: Toaster + ?Sized> Toast<'a, H> {
    /// Wrap `host` with the default configuration.
    pub fn new(host: &'a H) -> Self {
        Self::with_config(host, &Config::default())
    }

    /// Wrap `host` using `config` for the fail-fast policy and locator.
    pub fn with_config(host: &'a H, config: &Config) -> Self {
        Self {
            host,
            fail_fast: config.fail_fast,
            locator: config.location_provider(),
            self_test: false,
        }
    }

    /// Replace the location provider.
    pub fn with_locator(mut self, locator: impl LocationProvider + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Route failures to the host's log instead of its failure record, so
    /// the crate's own tests can inspect them without failing.
    #[cfg(any(test, feature = "self-test"))]
    #[doc(hidden)]
    pub fn self_test(mut self) -> Self {
        self.self_test = true;
        self
    }

    /// The wrapped host.
    pub fn host(&self) -> &'a H {
        self.host
    }

    #[track_caller]
    fn message(&self, fallback: &str, values: &[&dyn fmt::Display]) -> String {
        let location = self.locator.locate(Location::caller());
        format_message(fallback, values, location.as_ref())
    }

    fn log_err(&self, message: &str) {
        if self.self_test {
            self.host.log(message);
        } else {
            self.host.record_failure(message);
        }
    }

    fn fail(&self, message: String) {
        debug!(fail_fast = self.fail_fast, "{}", message);
        self.log_err(&message);
        if self.fail_fast {
            self.host.abort_now();
        }
    }

    /// Informational output, prefixed with the caller's location.
    #[track_caller]
    pub fn log(&self, values: &[&dyn fmt::Display]) {
        let message = self.message("", values);
        self.host.log(&message);
    }

    #[track_caller]
    pub fn logf(&self, args: fmt::Arguments<'_>) {
        self.log(&[&args]);
    }

    /// Record a failure unconditionally.
    #[track_caller]
    pub fn error(&self, values: &[&dyn fmt::Display]) {
        let message = self.message("", values);
        self.fail(message);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.error(&[&args]);
    }

    /// Fail with "assertion failed" (followed by `values`) unless `condition` holds.
    #[track_caller]
    pub fn assert(&self, condition: bool, values: &[&dyn fmt::Display]) {
        if condition {
            return;
        }
        let mut parts: Vec<&dyn fmt::Display> = Vec::with_capacity(values.len() + 1);
        parts.push(&ASSERT_FAILED);
        parts.extend_from_slice(values);
        let message = self.message(ASSERT_FAILED, &parts);
        self.fail(message);
    }

    /// Fail unless `left == right`, showing both sides.
    #[track_caller]
    pub fn assert_eq<L, R>(&self, left: L, right: R, values: &[&dyn fmt::Display])
    where
        L: PartialEq<R> + fmt::Debug,
        R: fmt::Debug,
    {
        if left == right {
            return;
        }
        let header = format!(
            "{}: left == right (left: {:?}, right: {:?})",
            ASSERT_FAILED, left, right
        );
        let mut parts: Vec<&dyn fmt::Display> = Vec::with_capacity(values.len() + 1);
        parts.push(&header);
        parts.extend_from_slice(values);
        let message = self.message(ASSERT_FAILED, &parts);
        self.fail(message);
    }

    /// Unwrap `result`, recording the error if there is one.
    ///
    /// Errors are rendered with `{:#}`, which prints the whole context
    /// chain for `anyhow::Error`.
    #[track_caller]
    pub fn check_err<V, E: fmt::Display>(&self, result: std::result::Result<V, E>) -> Option<V> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let text = format!("{:#}", err);
                let message = self.message(&text, &[]);
                self.fail(message);
                None
            }
        }
    }

    /// Fail unless `target` is one of the links of `err`'s cause chain.
    ///
    /// `expect_err(None, None)` passes; a missing error with a present
    /// target, or the reverse, fails.
    #[track_caller]
    pub fn expect_err<E>(&self, err: Option<&(dyn Error + 'static)>, target: Option<&E>)
    where
        E: Error + PartialEq + 'static,
    {
        if chain_contains(err, target) {
            return;
        }
        let text = format!("expecting {} got {}", Maybe(target), Maybe(err));
        let message = self.message(&text, &[]);
        self.fail(message);
    }

    /// Fail unless some link of `err`'s cause chain has type `E`.
    #[track_caller]
    pub fn expect_err_type<E>(&self, err: Option<&(dyn Error + 'static)>)
    where
        E: Error + 'static,
    {
        if chain_has_type::<E>(err) {
            return;
        }
        let text = format!(
            "expecting error of type {} got {}",
            std::any::type_name::<E>(),
            Maybe(err)
        );
        let message = self.message(&text, &[]);
        self.fail(message);
    }

    /// Fail unless `f` panics. The panic itself is always swallowed.
    #[track_caller]
    pub fn should_panic<F: FnOnce()>(&self, f: F, values: &[&dyn fmt::Display]) {
        if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
            return;
        }
        let message = self.message(EXPECTED_PANIC, values);
        self.fail(message);
    }

    /// Like [`should_panic`](Self::should_panic), but the panic message must
    /// also contain `expected`.
    #[track_caller]
    pub fn should_panic_with<F: FnOnce()>(
        &self,
        f: F,
        expected: &str,
        values: &[&dyn fmt::Display],
    ) {
        let payload = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => {
                let message = self.message(EXPECTED_PANIC, values);
                self.fail(message);
                return;
            }
            Err(payload) => payload,
        };

        let text = payload_text(payload.as_ref());
        if text.as_deref().is_some_and(|t| t.contains(expected)) {
            return;
        }
        let header = format!(
            "expected a panic containing {:?} got {:?}",
            expected,
            text.as_deref().unwrap_or("<non-string payload>")
        );
        let mut parts: Vec<&dyn fmt::Display> = Vec::with_capacity(values.len() + 1);
        parts.push(&header);
        parts.extend_from_slice(values);
        let message = self.message(EXPECTED_PANIC, &parts);
        self.fail(message);
    }

    /// Run `f` and log how long it took as `Time <name>: <ms>ms`.
    #[track_caller]
    pub fn time_it<R, F: FnOnce() -> R>(&self, name: &str, f: F) -> R {
        let timer = Instant::now();
        let out = f();
        let elapsed = timer.elapsed();
        trace!(name, elapsed_us = elapsed.as_micros() as u64, "timed section");

        let label = format!("{}:", name);
        let duration = format_millis(elapsed);
        let message = self.message("", &[&"Time", &label, &duration]);
        self.host.log(&message);
        out
    }

    /// Run `init`, then `body`, then `cleanup`.
    ///
    /// `cleanup` is armed before `body` starts and runs even if `body`
    /// panics or aborts. A panic in `init` propagates and neither `body`
    /// nor `cleanup` runs. Every step receives this same `Toast`.
    pub fn wrap<I, B, C>(&self, init: Option<I>, body: B, cleanup: Option<C>)
    where
        I: FnOnce(&Self),
        B: FnOnce(&Self),
        C: FnOnce(&Self),
    {
        if let Some(init) = init {
            init(self);
        }

        let _guard = cleanup.map(|cleanup| CleanupGuard {
            toast: self,
            cleanup: Some(cleanup),
        });

        body(self);
    }

    /// Builder over [`wrap`](Self::wrap) for when `init` or `cleanup` is absent.
    ///
    /// ```
    /// use toast::{LibtestHost, Toast};
    ///
    /// let host = LibtestHost::new();
    /// let t = Toast::new(&host);
    /// t.lifecycle()
    ///     .cleanup(|t| t.log(&[&"done"]))
    ///     .run(|t| t.assert(true, &[]));
    /// ```
    pub fn lifecycle(&self) -> Lifecycle<'_, 'a, H, fn(&Self), fn(&Self)> {
        Lifecycle {
            toast: self,
            init: None,
            cleanup: None,
        }
    }
}

/// Pass-through of the optional host capabilities.
impl<'a, H: ExtendedToaster + ?Sized> Toast<'a, H> {
    pub fn name(&self) -> String {
        self.host.name()
    }

    /// Register `f` to run when the host finishes the test.
    pub fn cleanup(&self, f: impl FnOnce() + 'static) {
        self.host.cleanup(Box::new(f));
    }

    #[track_caller]
    pub fn skip(&self, values: &[&dyn fmt::Display]) -> ! {
        let message = self.message("skipped", values);
        self.host.skip(&message)
    }

    pub fn skip_now(&self) -> ! {
        self.host.skip_now()
    }

    pub fn skipped(&self) -> bool {
        self.host.skipped()
    }

    pub fn set_env(&self, key: &str, value: &str) {
        self.host.set_env(key, value);
    }

    pub fn temp_dir(&self) -> Result<PathBuf> {
        self.host.temp_dir()
    }

    /// Record a failure and abort regardless of the fail-fast policy.
    #[track_caller]
    pub fn fatal(&self, values: &[&dyn fmt::Display]) -> ! {
        let message = self.message("", values);
        self.host.fatal(&message)
    }
}

/// Pending `init`/`cleanup` steps for [`Toast::wrap`].
pub struct Lifecycle<'t, 'a, H: Toaster + ?Sized, I, C> {
    toast: &'t Toast<'a, H>,
    init: Option<I>,
    cleanup: Option<C>,
}

impl<'t, 'a, H: Toaster + ?Sized, I, C> Lifecycle<'t, 'a, H, I, C> {
    pub fn init<I2>(self, init: I2) -> Lifecycle<'t, 'a, H, I2, C>
    where
        I2: FnOnce(&Toast<'a, H>),
    {
        Lifecycle {
            toast: self.toast,
            init: Some(init),
            cleanup: self.cleanup,
        }
    }

    pub fn cleanup<C2>(self, cleanup: C2) -> Lifecycle<'t, 'a, H, I, C2>
    where
        C2: FnOnce(&Toast<'a, H>),
    {
        Lifecycle {
            toast: self.toast,
            init: self.init,
            cleanup: Some(cleanup),
        }
    }

    pub fn run<B>(self, body: B)
    where
        I: FnOnce(&Toast<'a, H>),
        B: FnOnce(&Toast<'a, H>),
        C: FnOnce(&Toast<'a, H>),
    {
        self.toast.wrap(self.init, body, self.cleanup);
    }
}

struct CleanupGuard<'t, 'a, H: Toaster + ?Sized, C: FnOnce(&Toast<'a, H>)> {
    toast: &'t Toast<'a, H>,
    cleanup: Option<C>,
}

impl<'t, 'a, H: Toaster + ?Sized, C: FnOnce(&Toast<'a, H>)> Drop for CleanupGuard<'t, 'a, H, C> {
    fn drop(&mut self) {
        let Some(cleanup) = self.cleanup.take() else {
            return;
        };
        let toast = self.toast;

        if !thread::panicking() {
            cleanup(toast);
            return;
        }

        // A second panic while unwinding would abort the process.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| cleanup(toast))) {
            let text = payload_text(payload.as_ref())
                .unwrap_or_else(|| "<non-string payload>".to_string());
            toast.log_err(&format!("cleanup panicked: {}", text));
        }
    }
}

fn format_millis(elapsed: Duration) -> String {
    format!("{:.3}ms", elapsed.as_secs_f64() * 1000.0)
}
