//! Error codes - a typed classifier for *what* failed.
//!
//! A code is any enumerated integer type that can render itself and expose its
//! integer value. Two codes are the same code only when both the concrete type
//! and the integer match, so `ErrorCode::BadParameter` (0) never equals the
//! first variant of some other code enum that also happens to be 0.
//!
//! # Defining Codes
//!
//! Use [`define_error_codes!`](crate::define_error_codes) to declare an enum
//! together with its `Display` (the variant name) and [`ErrorCoder`] impls:
//!
//! ```rust
//! use bulwark_errors::{define_error_codes, ErrorCoder};
//!
//! define_error_codes! {
//!     /// Codes for the storage layer.
//!     pub enum StorageCode {
//!         DiskFull = 10,
//!         Corrupted = 11,
//!     }
//! }
//!
//! assert_eq!(StorageCode::DiskFull.to_string(), "DiskFull");
//! assert_eq!(StorageCode::Corrupted.int(), 11);
//! ```

use crate::Dynamic;
use std::any::Any;
use std::fmt;

/// Capability shared by every error code type.
///
/// The string form comes from `Display`. `Dynamic` provides the runtime type
/// tag used for same-type comparisons.
pub trait ErrorCoder: fmt::Display + fmt::Debug + Dynamic + Send + Sync {
    /// Integer value of the code.
    fn int(&self) -> i64;
}

/// Check that two codes have the same concrete type and the same integer.
#[inline]
pub fn same_code(a: &dyn ErrorCoder, b: &dyn ErrorCoder) -> bool {
    Any::type_id(a.as_any()) == Any::type_id(b.as_any()) && a.int() == b.int()
}

/// Check a type-erased code against a concrete one.
#[inline]
pub fn code_matches<C: ErrorCoder>(code: &dyn ErrorCoder, expected: &C) -> bool {
    code.as_any()
        .downcast_ref::<C>()
        .is_some_and(|c| c.int() == expected.int())
}

crate::define_error_codes! {
    /// The crate's built-in failure taxonomy.
    pub enum ErrorCode {
        /// A parameter is invalid, e.g. absent when absence is not allowed.
        BadParameter = 0,
        /// A function was called without its preconditions being met.
        InvalidUsage = 1,
        /// An object could not be fixed or resolved.
        FailFix = 2,
        /// An operation could not be completed due to an internal failure.
        OperationFail = 3,
        /// A context key was requested but does not exist.
        NoSuchKey = 4,
        /// An assertion failed.
        AssertFail = 5,
        /// A method was called on an object whose state is invalid.
        InvalidState = 6,
    }
}
