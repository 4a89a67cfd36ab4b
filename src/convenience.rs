//! Convenience macros.
//!
//! - [`define_error_codes!`](crate::define_error_codes): declare an error code
//!   enum with its `Display` and [`ErrorCoder`](crate::ErrorCoder) impls.
//! - [`cond_f!`](crate::cond_f), [`assert_ok!`](crate::assert_ok),
//!   [`assert_not_ok!`](crate::assert_not_ok),
//!   [`assert_no_err!`](crate::assert_no_err): format-string front-ends for the
//!   assertion helpers in [`assert`](crate::assert).
//!
//! The formatting macros only build the label when the guard fails, so a
//! passing assertion never allocates.

// ============================================================================
// Error Code Definitions
// ============================================================================

/// Declare an error code enum.
///
/// Generates the enum (with `Debug, Clone, Copy, PartialEq, Eq, Hash`), an
/// `ALL` constant listing every variant, a `Display` impl that writes the
/// variant name, and an [`ErrorCoder`](crate::ErrorCoder) impl whose `int()`
/// is the discriminant.
///
/// # Example
///
/// ```rust
/// # use bulwark_errors::{define_error_codes, ErrorCoder};
/// define_error_codes! {
///     pub enum ParseCode {
///         UnexpectedToken = 1,
///         UnexpectedEof = 2,
///     }
/// }
///
/// assert_eq!(ParseCode::UnexpectedEof.to_string(), "UnexpectedEof");
/// assert_eq!(ParseCode::UnexpectedEof.int(), 2);
/// assert_eq!(ParseCode::ALL.len(), 2);
/// ```
#[macro_export]
macro_rules! define_error_codes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let label = match self {
                    $( Self::$variant => stringify!($variant), )+
                };
                f.write_str(label)
            }
        }

        impl $crate::ErrorCoder for $name {
            #[inline]
            fn int(&self) -> i64 {
                *self as i64
            }
        }
    };
}

// ============================================================================
// Formatted Assertions
// ============================================================================

/// Assert a condition with a formatted message.
///
/// ```rust
/// # use bulwark_errors::cond_f;
/// let len = 3;
/// cond_f!(len > 0, "len = {}, want > 0", len);
/// ```
#[macro_export]
macro_rules! cond_f {
    ($cond:expr, $($arg:tt)+) => {
        $crate::assert::cond_f($cond, format_args!($($arg)+))
    };
}

/// Assert that a boolean is true; the failure message ends with `= false`.
///
/// ```rust
/// # use bulwark_errors::assert_ok;
/// let map = std::collections::HashMap::from([("k", 1)]);
/// assert_ok!(map.contains_key("k"), "map.contains_key({:?})", "k");
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($ok:expr, $($arg:tt)+) => {
        $crate::assert::ok($ok, format_args!($($arg)+))
    };
}

/// Assert that a boolean is false; the failure message ends with `= true`.
#[macro_export]
macro_rules! assert_not_ok {
    ($ok:expr, $($arg:tt)+) => {
        $crate::assert::not_ok($ok, format_args!($($arg)+))
    };
}

/// Assert that a `Result` is `Ok`; the failure message is `<label> = <error>`.
///
/// ```rust
/// # use bulwark_errors::assert_no_err;
/// let parsed: Result<u8, std::num::ParseIntError> = "7".parse();
/// assert_no_err!(parsed.as_ref().err(), "parse({:?})", "7");
/// ```
#[macro_export]
macro_rules! assert_no_err {
    ($err:expr, $($arg:tt)+) => {
        $crate::assert::no_err($err, format_args!($($arg)+))
    };
}

// ============================================================================
// Tests
// ============================================================================
