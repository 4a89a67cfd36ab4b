//! Predefined constructors for the built-in [`ErrorCode`] taxonomy.
//!
//! Each helper fixes the code and the message wording so the same failure
//! reads the same everywhere:
//!
//! | Constructor | Code | Message |
//! |---|---|---|
//! | [`invalid_parameter`] | `BadParameter` | caller-supplied |
//! | [`nil_parameter`] | `BadParameter` | `parameter ("<name>") must not be nil` |
//! | [`invalid_usage`] | `InvalidUsage` | caller-supplied, usage as a suggestion |
//! | [`fix_failed`] | `FailFix` | caller-supplied, reason as inner error |
//! | [`failed_at`] | `OperationFail` | `an error occurred at <where>` |
//! | [`failed_after`] | `OperationFail` | `an error occurred after <what>` |
//! | [`failed_before`] | `OperationFail` | `an error occurred before <what>` |
//! | [`no_such_key`] | `NoSuchKey` | `key ("<key>") does not exist` |
//! | [`assert_fail`] | `AssertFail` (FATAL) | caller-supplied |
//!
//! All of them have severity ERROR except [`assert_fail`].

use crate::{BoxError, ErrorCode, Fault, SeverityLevel};
use std::borrow::Cow;

/// A parameter is invalid.
#[inline]
pub fn invalid_parameter(message: impl Into<Cow<'static, str>>) -> Fault {
    Fault::new(ErrorCode::BadParameter, message)
}

/// A parameter is absent although it is required.
///
/// ```rust
/// # use bulwark_errors::definitions;
/// let fault = definitions::nil_parameter("config");
/// assert_eq!(fault.message(), r#"parameter ("config") must not be nil"#);
/// ```
#[inline]
pub fn nil_parameter(parameter: &str) -> Fault {
    Fault::new(
        ErrorCode::BadParameter,
        format!("parameter ({parameter:?}) must not be nil"),
    )
}

/// A function was called the wrong way; `usage` says how to call it.
pub fn invalid_usage(
    message: impl Into<Cow<'static, str>>,
    usage: impl Into<Cow<'static, str>>,
) -> Fault {
    Fault::new(ErrorCode::InvalidUsage, message).with_suggestion(usage)
}

/// An object could not be fixed because of `reason`.
pub fn fix_failed(message: impl Into<Cow<'static, str>>, reason: impl Into<BoxError>) -> Fault {
    Fault::new(ErrorCode::FailFix, message).with_inner(reason)
}

/// An operation failed at a named point.
pub fn failed_at(at: &str, reason: impl Into<BoxError>) -> Fault {
    operation_failed(at, "an error occurred at ", "an error occurred somewhere", reason)
}

/// An operation failed after a named step.
pub fn failed_after(before: &str, reason: impl Into<BoxError>) -> Fault {
    operation_failed(
        before,
        "an error occurred after ",
        "an error occurred after something",
        reason,
    )
}

/// An operation failed before reaching a named step.
pub fn failed_before(after: &str, reason: impl Into<BoxError>) -> Fault {
    operation_failed(
        after,
        "an error occurred before ",
        "an error occurred before something",
        reason,
    )
}

fn operation_failed(
    place: &str,
    prefix: &'static str,
    unnamed: &'static str,
    reason: impl Into<BoxError>,
) -> Fault {
    let message: Cow<'static, str> = if place.is_empty() {
        Cow::Borrowed(unnamed)
    } else {
        Cow::Owned(format!("{prefix}{place}"))
    };
    Fault::new(ErrorCode::OperationFail, message).with_inner(reason)
}

/// A context key does not exist.
#[inline]
pub fn no_such_key(key: &str) -> Fault {
    Fault::new(ErrorCode::NoSuchKey, format!("key ({key:?}) does not exist"))
}

/// An assertion failed. Always FATAL.
#[inline]
pub fn assert_fail(message: impl Into<Cow<'static, str>>) -> Fault {
    Fault::with_severity(SeverityLevel::Fatal, ErrorCode::AssertFail, message)
}
