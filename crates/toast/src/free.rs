//! The assertion primitives as plain functions.
//!
//! Each function takes the [`Config`] explicitly instead of consulting
//! process-wide state; `&Config::default()` gives the usual behaviour
//! (fail fast, caller location prefix). They build a short-lived
//! [`Toast`] and delegate to it, so results are identical.
//!
//! ```
//! use toast::{free, Config, LibtestHost};
//!
//! let host = LibtestHost::new();
//! let config = Config::default();
//! free::assert(&config, &host, 2 * 2 == 4, &[]);
//! free::assert_or_panic(true, &[&"no host needed"]);
//! ```

use std::error::Error;
use std::fmt;
use std::panic::Location;

use crate::config::Config;
use crate::decorator::Toast;
use crate::location::{CallerLocator, LocationProvider};
use crate::message::{format_message, ASSERT_FAILED};
use crate::toaster::Toaster;

#[track_caller]
pub fn log<H: Toaster + ?Sized>(config: &Config, host: &H, values: &[&dyn fmt::Display]) {
    Toast::with_config(host, config).log(values);
}

#[track_caller]
pub fn error<H: Toaster + ?Sized>(config: &Config, host: &H, values: &[&dyn fmt::Display]) {
    Toast::with_config(host, config).error(values);
}

#[track_caller]
pub fn assert<H: Toaster + ?Sized>(
    config: &Config,
    host: &H,
    condition: bool,
    values: &[&dyn fmt::Display],
) {
    Toast::with_config(host, config).assert(condition, values);
}

#[track_caller]
pub fn assert_eq<H, L, R>(config: &Config, host: &H, left: L, right: R, values: &[&dyn fmt::Display])
where
    H: Toaster + ?Sized,
    L: PartialEq<R> + fmt::Debug,
    R: fmt::Debug,
{
    Toast::with_config(host, config).assert_eq(left, right, values);
}

#[track_caller]
pub fn check_err<H, V, E>(config: &Config, host: &H, result: Result<V, E>) -> Option<V>
where
    H: Toaster + ?Sized,
    E: fmt::Display,
{
    Toast::with_config(host, config).check_err(result)
}

#[track_caller]
pub fn expect_err<H, E>(
    config: &Config,
    host: &H,
    err: Option<&(dyn Error + 'static)>,
    target: Option<&E>,
) where
    H: Toaster + ?Sized,
    E: Error + PartialEq + 'static,
{
    Toast::with_config(host, config).expect_err(err, target);
}

#[track_caller]
pub fn expect_err_type<H, E>(config: &Config, host: &H, err: Option<&(dyn Error + 'static)>)
where
    H: Toaster + ?Sized,
    E: Error + 'static,
{
    Toast::with_config(host, config).expect_err_type::<E>(err);
}

#[track_caller]
pub fn should_panic<H, F>(config: &Config, host: &H, f: F, values: &[&dyn fmt::Display])
where
    H: Toaster + ?Sized,
    F: FnOnce(),
{
    Toast::with_config(host, config).should_panic(f, values);
}

#[track_caller]
pub fn should_panic_with<H, F>(
    config: &Config,
    host: &H,
    f: F,
    expected: &str,
    values: &[&dyn fmt::Display],
) where
    H: Toaster + ?Sized,
    F: FnOnce(),
{
    Toast::with_config(host, config).should_panic_with(f, expected, values);
}

#[track_caller]
pub fn time_it<H, R, F>(config: &Config, host: &H, name: &str, f: F) -> R
where
    H: Toaster + ?Sized,
    F: FnOnce() -> R,
{
    Toast::with_config(host, config).time_it(name, f)
}

/// [`Toast::wrap`] over a bare host: each step receives `host` itself.
pub fn wrap<H, I, B, C>(config: &Config, host: &H, init: Option<I>, body: B, cleanup: Option<C>)
where
    H: Toaster + ?Sized,
    I: FnOnce(&H),
    B: FnOnce(&H),
    C: FnOnce(&H),
{
    let toast = Toast::with_config(host, config);
    toast.wrap(
        init.map(|f| move |t: &Toast<'_, H>| f(t.host())),
        |t| body(t.host()),
        cleanup.map(|f| move |t: &Toast<'_, H>| f(t.host())),
    );
}

/// Panic with a formatted "assertion failed" message unless `condition` holds.
#[track_caller]
pub fn assert_or_panic(condition: bool, values: &[&dyn fmt::Display]) {
    if condition {
        return;
    }
    let location = CallerLocator.locate(Location::caller());
    let mut parts: Vec<&dyn fmt::Display> = Vec::with_capacity(values.len() + 1);
    parts.push(&ASSERT_FAILED);
    parts.extend_from_slice(values);
    panic!("{}", format_message(ASSERT_FAILED, &parts, location.as_ref()));
}
