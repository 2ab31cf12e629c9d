//! Caller location lookup for diagnostic prefixes.
//!
//! Every public primitive in this crate is `#[track_caller]`, so
//! [`std::panic::Location::caller`] already resolves past the library's own
//! frames to the first frame written by the test author. A
//! [`LocationProvider`] then decides whether that candidate is worth
//! reporting, or whether to look further out. The result only ever
//! decorates messages; it never changes what an assertion does.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::path::{Component, Path};

/// A `file:line` position in test source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file as recorded by the compiler
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl SourceLocation {
    /// Capture the location of whoever called the current `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(loc: &Location<'_>) -> Self {
        Self {
            file: loc.file().to_string(),
            line: loc.line(),
            column: loc.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Decides which location, if any, prefixes a diagnostic.
///
/// `candidate` is the first frame outside the library. Returning `None`
/// means "no test frame found"; implementations must not invent one.
pub trait LocationProvider {
    fn locate(&self, candidate: &Location<'_>) -> Option<SourceLocation>;
}

/// Reports the immediate caller unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerLocator;

impl LocationProvider for CallerLocator {
    fn locate(&self, candidate: &Location<'_>) -> Option<SourceLocation> {
        Some(SourceLocation::from(candidate))
    }
}

/// Reports the nearest frame that lives in a test file.
///
/// A path matches when a pattern equals one of its directory components
/// (e.g. `tests`) or its whole file name (e.g. `tests.rs`). Patterns that
/// start with `_` are suffixes and match the end of the file name
/// (e.g. `_test.rs`).
///
/// The `#[track_caller]` candidate is tried first. Helpers that are not
/// `#[track_caller]` hide the test from it, so on a miss the locator walks a
/// captured backtrace outward and takes the first frame that matches. Without
/// debug info there is nothing to walk and the result is `None`.
#[derive(Debug, Clone)]
pub struct TestFileLocator {
    patterns: Vec<String>,
}

/// Default naming conventions for test sources.
pub const DEFAULT_TEST_PATTERNS: &[&str] = &["tests", "_test.rs", "_tests.rs", "tests.rs"];

impl TestFileLocator {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `file` follows one of the configured conventions.
    pub fn matches(&self, file: &str) -> bool {
        let path = Path::new(file);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        self.patterns.iter().any(|pattern| {
            let named = if pattern.starts_with('_') {
                file_name.ends_with(pattern.as_str())
            } else {
                file_name == pattern.as_str()
            };
            if named {
                return true;
            }
            path.parent().into_iter().flat_map(Path::components).any(|c| {
                matches!(c, Component::Normal(dir) if dir.to_str() == Some(pattern.as_str()))
            })
        })
    }
}

impl Default for TestFileLocator {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_PATTERNS.iter().copied())
    }
}

impl LocationProvider for TestFileLocator {
    fn locate(&self, candidate: &Location<'_>) -> Option<SourceLocation> {
        if self.matches(candidate.file()) {
            return Some(SourceLocation::from(candidate));
        }
        let trace = Backtrace::force_capture().to_string();
        let found = frame_locations(&trace).find(|loc| self.matches(&loc.file));
        found
    }
}

/// Source positions of a rendered backtrace, innermost frame first.
///
/// Frames print their position on an `at <file>:<line>:<column>` line;
/// frames without one (no debug info) are skipped.
fn frame_locations(trace: &str) -> impl Iterator<Item = SourceLocation> + '_ {
    trace.lines().filter_map(|line| {
        let at = line.trim_start().strip_prefix("at ")?;
        let mut parts = at.rsplitn(3, ':');
        let column = parts.next()?.parse().ok()?;
        let line = parts.next()?.parse().ok()?;
        let file = parts.next()?;
        Some(SourceLocation {
            file: file.to_string(),
            line,
            column,
        })
    })
}

/// Never reports a location.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn locate(&self, _candidate: &Location<'_>) -> Option<SourceLocation> {
        None
    }
}
