//! Finding faults inside arbitrary error chains.
//!
//! The chain is walked depth-first: the error itself, then each `source()`.
//! A [`JoinedError`] branches, and its outer half is searched before its
//! inner half. The first [`Fault`] found decides the answer.

use crate::codes::code_matches;
use crate::merge::JoinedError;
use crate::{ErrorCoder, Fault};
use std::error::Error;

/// Whether the first fault in `err`'s chain has `code`.
///
/// ```rust
/// use bulwark_errors::{ErrorCode, Fault, classify};
///
/// let fault = Fault::new(ErrorCode::NoSuchKey, "missing");
/// assert!(classify::is(Some(&fault), ErrorCode::NoSuchKey));
/// assert!(!classify::is(Some(&fault), ErrorCode::BadParameter));
/// assert!(!classify::is(None, ErrorCode::NoSuchKey));
/// ```
#[inline]
pub fn is<C: ErrorCoder>(err: Option<&(dyn Error + 'static)>, code: C) -> bool {
    as_fault_with_code(err, code).is_some()
}

/// First fault in `err`'s chain.
pub fn as_fault<'a>(err: Option<&'a (dyn Error + 'static)>) -> Option<&'a Fault> {
    first_fault(err?)
}

/// First fault in `err`'s chain, if its code is `code`.
pub fn as_fault_with_code<'a, C: ErrorCoder>(
    err: Option<&'a (dyn Error + 'static)>,
    code: C,
) -> Option<&'a Fault> {
    as_fault(err).filter(|fault| code_matches(fault.code(), &code))
}

fn first_fault<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a Fault> {
    let mut current = Some(err);

    while let Some(err) = current {
        if let Some(fault) = err.downcast_ref::<Fault>() {
            return Some(fault);
        }

        if let Some(joined) = err.downcast_ref::<JoinedError>() {
            let outer: &'a (dyn Error + 'static) = joined.outer();
            let inner: &'a (dyn Error + 'static) = joined.inner();
            return first_fault(outer).or_else(|| first_fault(inner));
        }

        current = err.source();
    }

    None
}
