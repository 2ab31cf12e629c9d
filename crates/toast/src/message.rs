//! Diagnostic message construction.

use std::any::Any;
use std::fmt::{self, Write};

use crate::location::SourceLocation;

/// Text recorded by a failed `assert`.
pub const ASSERT_FAILED: &str = "assertion failed";

/// Build a diagnostic line.
///
/// With no `values` the message is `fallback`. Otherwise every value is
/// rendered through its `Display` impl and joined by single spaces, in
/// order. A location, when present, always comes first:
///
/// ```
/// use toast::{format_message, SourceLocation};
///
/// let loc = SourceLocation { file: "tests/a.rs".into(), line: 7, column: 1 };
/// assert_eq!(format_message("oops", &[], None), "oops");
/// assert_eq!(format_message("oops", &[&1, &"two"], None), "1 two");
/// assert_eq!(format_message("oops", &[], Some(&loc)), "    tests/a.rs:7: oops");
/// ```
pub fn format_message(
    fallback: &str,
    values: &[&dyn fmt::Display],
    location: Option<&SourceLocation>,
) -> String {
    let mut out = String::new();

    if let Some(loc) = location {
        // Indented so the prefix stands apart from libtest's own output.
        let _ = write!(out, "    {}:", loc);
    }

    if values.is_empty() {
        push_separated(&mut out, fallback);
        return out;
    }

    for value in values {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{}", value);
    }
    out
}

fn push_separated(out: &mut String, text: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(text);
}

/// Extract the human-readable text of a panic payload.
///
/// Only `&str` and `String` payloads carry text; anything raised with
/// `panic_any` and a custom type yields `None`.
pub fn payload_text(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(text) = payload.downcast_ref::<&str>() {
        Some((*text).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}
