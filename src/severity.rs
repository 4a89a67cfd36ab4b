//! Severity levels for structured faults.
//!
//! Severity is orthogonal to the error code: the code says *what* failed,
//! the severity says *how bad* it is.
//!
//! | Level | Ordinal | Meaning |
//! |-------|---------|---------|
//! | `INFO` | 0 | Informational, no action needed |
//! | `WARNING` | 1 | Something looks off but execution can continue |
//! | `ERROR` | 2 | Default recoverable failure |
//! | `FATAL` | 3 | Violated invariant; used by every assertion helper |

use std::borrow::Cow;
use std::fmt;

/// Ordinal severity of a [`Fault`](crate::Fault).
///
/// Levels are totally ordered by their ordinal, so `Info < Warning < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum SeverityLevel {
    /// Informational.
    Info = 0,
    /// Recoverable oddity.
    Warning = 1,
    /// Default level for constructed faults.
    #[default]
    Error = 2,
    /// Unrecoverable; assertion failures always use this level.
    Fatal = 3,
}

impl SeverityLevel {
    /// All levels in ascending order.
    pub const ALL: [SeverityLevel; 4] = [Self::Info, Self::Warning, Self::Error, Self::Fatal];

    /// Upper-case name of the level. Zero-allocation.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Numeric ordinal of the level.
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Render any ordinal, including ones that do not name a level.
    ///
    /// ```rust
    /// # use bulwark_errors::SeverityLevel;
    /// assert_eq!(SeverityLevel::name_of(3), "FATAL");
    /// assert_eq!(SeverityLevel::name_of(9), "SeverityLevel(9)");
    /// ```
    pub fn name_of(ordinal: u8) -> Cow<'static, str> {
        match Self::try_from(ordinal) {
            Ok(level) => Cow::Borrowed(level.as_str()),
            Err(invalid) => Cow::Owned(invalid.to_string()),
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for SeverityLevel {
    type Error = InvalidSeverity;

    fn try_from(value: u8) -> Result<Self, InvalidSeverity> {
        match value {
            0 => Ok(Self::Info),
            1 => Ok(Self::Warning),
            2 => Ok(Self::Error),
            3 => Ok(Self::Fatal),
            other => Err(InvalidSeverity(other)),
        }
    }
}

/// An ordinal that does not name a [`SeverityLevel`].
///
/// Displays as `SeverityLevel(<n>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverity(pub u8);

impl fmt::Display for InvalidSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeverityLevel({})", self.0)
    }
}

impl std::error::Error for InvalidSeverity {}
