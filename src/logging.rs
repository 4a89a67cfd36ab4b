//! Structured log view of a fault.
//!
//! # Properties
//!
//! - Borrows from the [`Fault`] with an explicit lifetime and cannot outlive it
//! - Accessors never allocate
//! - [`FaultLog::write_to`] writes one line straight into any `fmt::Write`,
//!   truncating every field so a single fault cannot flood a log pipeline
//!
//! The view is meant to be consumed immediately by a logger, either through
//! [`Fault::log`] or the callback form [`Fault::with_log`].

use crate::context::Info;
use crate::trace::{FRAME_SEPARATOR, StackTrace};
use crate::{ErrorCoder, Fault, NO_MESSAGE, SeverityLevel};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output.
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Appended to truncated fields.
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Borrowed, structured view of a fault.
///
/// # Example
///
/// ```rust
/// # use bulwark_errors::{ErrorCode, Fault};
/// let fault = Fault::new(ErrorCode::NoSuchKey, "key missing")
///     .with_context("key", "port")
///     .with_frame("load_config");
///
/// let mut line = String::new();
/// fault.log().write_to(&mut line).unwrap();
/// assert_eq!(
///     line,
///     "[ERROR] NoSuchKey message='key missing' key='port' frames='load_config'"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FaultLog<'a> {
    severity: SeverityLevel,
    code: &'a dyn ErrorCoder,
    message: &'a str,
    info: Option<&'a Info>,
}

impl<'a> FaultLog<'a> {
    pub(crate) fn new(fault: &'a Fault) -> Self {
        Self {
            severity: fault.severity(),
            code: fault.code(),
            message: fault.message(),
            info: fault.info(),
        }
    }

    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Materializes every field into a `String`. Only available with the
    /// `trusted_debug` feature in builds with debug assertions.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut output);

        if let Some(ts) = self.timestamp() {
            output.push_str(&format!(" at='{}'", ts.to_rfc3339()));
        }

        output
    }

    /// Write the single-line form without allocating for untruncated fields.
    ///
    /// `[SEVERITY] Code message='..' suggestion='..' key='..' frames='a -> b' inner=yes`
    ///
    /// Absent sections are omitted. Each field (and each frame) is capped at
    /// 1024 bytes on a UTF-8 boundary.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        let message = if self.message.is_empty() {
            NO_MESSAGE
        } else {
            self.message
        };

        write!(
            f,
            "[{}] {} message='{}'",
            self.severity,
            self.code,
            truncate_with_indicator(message)
        )?;

        for suggestion in self.suggestions() {
            write!(f, " suggestion='{}'", truncate_with_indicator(suggestion))?;
        }

        for (key, value) in self.context() {
            write!(
                f,
                " {}='{}'",
                truncate_with_indicator(key),
                truncate_with_indicator(value)
            )?;
        }

        if let Some(trace) = self.stack_trace() {
            f.write_str(" frames='")?;
            for (i, frame) in trace.frames().enumerate() {
                if i > 0 {
                    f.write_str(FRAME_SEPARATOR)?;
                }
                f.write_str(&truncate_with_indicator(frame))?;
            }
            f.write_char('\'')?;
        }

        if self.has_inner() {
            f.write_str(" inner=yes")?;
        }

        Ok(())
    }

    // Fields are not truncated here; that is the log sink's responsibility
    // when it serializes them.

    /// Severity of the fault.
    #[inline]
    pub const fn severity(&self) -> SeverityLevel {
        self.severity
    }

    /// Error code.
    #[inline]
    pub fn code(&self) -> &'a dyn ErrorCoder {
        self.code
    }

    /// Raw message, possibly empty.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Creation time of the attached info.
    #[inline]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.info.and_then(Info::timestamp)
    }

    /// Suggestions in insertion order.
    pub fn suggestions(&self) -> impl Iterator<Item = &'a str> {
        self.info.into_iter().flat_map(Info::suggestions)
    }

    /// Context keys with their rendered values.
    pub fn context(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.info
            .into_iter()
            .flat_map(Info::context)
            .map(|(key, entry)| (key, entry.rendered()))
    }

    /// Stack trace, if any frame was recorded.
    #[inline]
    pub fn stack_trace(&self) -> Option<&'a StackTrace> {
        self.info.and_then(Info::stack_trace)
    }

    /// Whether the fault wraps an inner error.
    #[inline]
    pub fn has_inner(&self) -> bool {
        self.info.is_some_and(|info| info.inner().is_some())
    }
}

/// Truncate a field for output, keeping the result valid UTF-8.
///
/// Borrows when the field already fits.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
