//! Self-checking and self-repairing objects.
//!
//! Types implement [`Validatable`] and/or [`Fixable`]; callers then use
//! either the non-panicking [`try_validate`] / [`try_fix`] here, or the
//! panicking [`assert::validate`](crate::assert::validate) /
//! [`assert::fix`](crate::assert::fix) when a failure is a broken invariant.
//!
//! ```rust
//! use bulwark_errors::{ErrorCode, Fault, Fixable, capability};
//!
//! struct Window { width: u32 }
//!
//! impl Fixable for Window {
//!     type Error = Fault;
//!
//!     fn fix(&mut self) -> Result<(), Fault> {
//!         if self.width == 0 {
//!             return Err(Fault::new(ErrorCode::BadParameter, "width = 0"));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut w = Window { width: 0 };
//! let err = capability::try_fix("window", Some(&mut w), false).unwrap_err();
//! assert!(err.is(ErrorCode::FailFix));
//! assert_eq!(err.message(), "width = 0");
//! ```

use crate::{ErrorCode, Fault};
use std::error::Error;

/// Name used when the caller gives none.
const DEFAULT_NAME: &str = "struct{}";

/// An object that can check its own invariants.
pub trait Validatable {
    /// Reason the object is invalid.
    type Error: Error + Send + Sync + 'static;

    /// Check the object's invariants.
    fn validate(&self) -> Result<(), Self::Error>;
}

/// An object that can repair or resolve its own state.
pub trait Fixable {
    /// Reason the object could not be fixed.
    type Error: Error + Send + Sync + 'static;

    /// Fix the object in place.
    fn fix(&mut self) -> Result<(), Self::Error>;
}

/// Validate an optional object without panicking.
///
/// An absent object is fine when `allow_nil`, otherwise an `InvalidState`
/// fault `"<name>" must not be nil`. A validation error is wrapped in an
/// `InvalidState` fault with the frame `<name>.Validate()`.
pub fn try_validate<V>(name: &str, value: Option<&V>, allow_nil: bool) -> crate::Result<()>
where
    V: Validatable + ?Sized,
{
    let name = if name.is_empty() { DEFAULT_NAME } else { name };

    match value {
        None if allow_nil => Ok(()),
        None => Err(Fault::new(ErrorCode::InvalidState, nil_message(name))),
        Some(value) => value.validate().map_err(|err| {
            let mut fault = Fault::wrap(ErrorCode::InvalidState, err);
            fault.add_frame(format!("{name}.Validate()"));
            fault
        }),
    }
}

/// Fix an optional object without panicking.
///
/// Same rules as [`try_validate`] with code `FailFix` and frame
/// `<name>.Fix()`.
pub fn try_fix<V>(name: &str, value: Option<&mut V>, allow_nil: bool) -> crate::Result<()>
where
    V: Fixable + ?Sized,
{
    let name = if name.is_empty() { DEFAULT_NAME } else { name };

    match value {
        None if allow_nil => Ok(()),
        None => Err(Fault::new(ErrorCode::FailFix, nil_message(name))),
        Some(value) => value.fix().map_err(|err| {
            let mut fault = Fault::wrap(ErrorCode::FailFix, err);
            fault.add_frame(format!("{name}.Fix()"));
            fault
        }),
    }
}

fn nil_message(name: &str) -> String {
    format!("{name:?} must not be nil")
}
