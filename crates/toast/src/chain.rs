//! Walking an error's `source()` chain.

use std::error::Error;
use std::fmt;

/// Iterate `err` followed by each of its causes, outermost first.
pub fn cause_chain<'e>(
    err: &'e (dyn Error + 'static),
) -> impl Iterator<Item = &'e (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// Identity check: is `target` one of the links of `err`'s chain?
///
/// Links are compared with `PartialEq` after downcasting to `E`, so a
/// different value of the right type does not match. Two absent values
/// match; an absent error never contains a present target and vice versa.
pub fn chain_contains<E>(err: Option<&(dyn Error + 'static)>, target: Option<&E>) -> bool
where
    E: Error + PartialEq + 'static,
{
    match (err, target) {
        (None, None) => true,
        (Some(err), Some(target)) => {
            cause_chain(err).any(|link| link.downcast_ref::<E>() == Some(target))
        }
        _ => false,
    }
}

/// Type check: does any link of `err`'s chain have type `E`?
pub fn chain_has_type<E>(err: Option<&(dyn Error + 'static)>) -> bool
where
    E: Error + 'static,
{
    err.map_or(false, |err| cause_chain(err).any(|link| link.is::<E>()))
}

/// Renders an optional value, showing absence as `<none>`.
pub(crate) struct Maybe<'v, T: ?Sized>(pub Option<&'v T>);

impl<T: fmt::Display + ?Sized> fmt::Display for Maybe<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => f.write_str("<none>"),
        }
    }
}
