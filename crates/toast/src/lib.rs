//! Toast: assertion and lifecycle helpers for Rust tests.
//!
//! A thin layer over a host test context, providing:
//! - Condition, equality and error assertions with a fail-fast policy
//! - Panic expectation
//! - Timed sections
//! - Init / body / cleanup wrapping with guaranteed cleanup
//! - Diagnostics prefixed with the calling test's `file:line`
//!
//! # Quick Start
//!
//! ```
//! use toast::{LibtestHost, Toast};
//!
//! let host = LibtestHost::new();
//! let mut t = Toast::new(&host);
//!
//! t.assert(2 + 2 == 4, &[&"math"]);
//! t.should_panic(|| panic!("expected"), &[]);
//!
//! // Keep going after failures instead of stopping at the first one.
//! t.fail_fast = false;
//! let parsed = t.check_err("7".parse::<u8>());
//! assert_eq!(parsed, Some(7));
//! ```
//!
//! # Error identity
//!
//! [`Toast::expect_err`] walks the `source()` chain looking for a value
//! equal to the target, so wrapping an error does not hide it:
//!
//! ```
//! use std::fmt;
//! use toast::{LibtestHost, Toast};
//!
//! #[derive(Debug, PartialEq)]
//! struct NotFound;
//!
//! impl fmt::Display for NotFound {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         f.write_str("not found")
//!     }
//! }
//!
//! impl std::error::Error for NotFound {}
//!
//! let host = LibtestHost::new();
//! let t = Toast::new(&host);
//! let err = anyhow::Error::new(NotFound).context("loading user 7");
//! t.expect_err(Some(&*err), Some(&NotFound));
//! ```
//!
//! # Lifecycle
//!
//! ```
//! use toast::{LibtestHost, Toast};
//!
//! let host = LibtestHost::new();
//! let t = Toast::new(&host);
//! t.lifecycle()
//!     .init(|t| t.log(&[&"connecting"]))
//!     .cleanup(|t| t.log(&[&"disconnecting"]))
//!     .run(|t| t.assert(true, &[]));
//! ```
//!
//! # Hosts
//!
//! Any type implementing [`Toaster`] can back a [`Toast`]. [`LibtestHost`]
//! adapts the standard `#[test]` harness; hosts that also implement
//! [`ExtendedToaster`] unlock pass-through helpers such as
//! [`Toast::temp_dir`] and [`Toast::cleanup`].

mod chain;
mod config;
mod decorator;
mod error;
pub mod free;
mod host;
mod location;
mod message;
mod toaster;


pub use chain::{cause_chain, chain_contains, chain_has_type};
pub use config::{Config, LocatorConfig, CONFIG_FILE, ENV_FAIL_FAST, ENV_LOCATION};
pub use decorator::{Lifecycle, Toast};
pub use error::{Result, ToastError};
pub use host::{LibtestHost, Skipped};
pub use location::{
    CallerLocator, LocationProvider, NoLocation, SourceLocation, TestFileLocator,
    DEFAULT_TEST_PATTERNS,
};
pub use message::{format_message, payload_text, ASSERT_FAILED};
pub use toaster::{ExtendedToaster, Toaster};
