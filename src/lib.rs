//! # Bulwark Errors
//!
//! Structured error values and the assertion guards that raise them.
//!
//! ## Design Philosophy
//!
//! 1. **A fault says what failed** (a typed [`ErrorCoder`] code), **how bad it
//!    is** ([`SeverityLevel`]) and **why** (a message)
//! 2. **Diagnostics travel with the fault** in an owned [`Info`]: suggestions,
//!    a creation timestamp, named context values, stack frames and the cause
//! 3. **One owner per Info**: wrapping a fault moves its Info into the wrapper
//! 4. **The short form stays on one line** so it composes inside other text;
//!    the multi-section rendering is opt-in through [`display_error`]
//! 5. **Violated invariants are never recoverable**: every helper in
//!    [`assert`] panics with a FATAL fault
//!
//! ## Quick Start
//!
//! ```rust
//! use bulwark_errors::{ErrorCode, Fault, Result, display_error};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse().map_err(|e| {
//!         let mut fault = Fault::wrap(ErrorCode::BadParameter, e);
//!         fault.add_suggestion("ports are integers between 0 and 65535");
//!         fault.add_context("raw", raw.to_owned());
//!         fault.add_frame("parse_port");
//!         fault
//!     })
//! }
//!
//! let fault = parse_port("http").unwrap_err();
//! assert_eq!(
//!     fault.to_string(),
//!     "[ERROR] BadParameter: invalid digit found in string"
//! );
//!
//! let mut out = Vec::new();
//! display_error(Some(&mut out), Some(&fault)).unwrap();
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.contains("- raw: http"));
//! assert!(text.contains("Stack trace:\n- parse_port"));
//! ```
//!
//! ## Assertions
//!
//! ```rust,should_panic
//! use bulwark_errors::assert;
//!
//! let retries: u32 = 0;
//! assert::not_zero(&retries, "retries"); // panics: [FATAL] AssertFail: retries = 0
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: enable [`FaultLog::format_for_trusted_debug`] (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;
use std::sync::Arc;

pub mod assert;
pub mod capability;
pub mod classify;
pub mod codes;
pub mod config;
pub mod context;
pub mod convenience;
pub mod definitions;
pub mod display;
pub mod dynamic;
pub mod logging;
pub mod merge;
pub mod ring_buffer;
pub mod severity;
pub mod trace;

pub use capability::{Fixable, Validatable};
pub use classify::{as_fault, as_fault_with_code, is};
pub use codes::{ErrorCode, ErrorCoder, code_matches, same_code};
pub use config::DiagnosticSink;
pub use context::{ContextEntry, Info, SharedError};
pub use display::{display_error, panic_with};
pub use dynamic::Dynamic;
pub use logging::FaultLog;
pub use merge::{JoinedError, merge_errors, merge_info};
pub use ring_buffer::{JournalEntry, RingBufferLogger};
pub use severity::{InvalidSeverity, SeverityLevel};
pub use trace::StackTrace;

/// Type alias for Results using [`Fault`].
pub type Result<T> = result::Result<T, Fault>;

/// Owned, thread-safe, type-erased error.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Rendered in place of an empty message.
pub const NO_MESSAGE: &str = "[no message was provided]";

/// Message used when a fault is built from an absent source error.
pub const UNKNOWN_FAILURE: &str = "something went wrong";

/// Structured error value.
///
/// # Key Properties
///
/// - `code` is fixed at construction; `severity` changes only through
///   [`change_severity`](Self::change_severity)
/// - the fault exclusively owns its [`Info`]; wrapping it with
///   [`from_fault`](Self::from_fault) or [`from_error`](Self::from_error)
///   moves the Info into the wrapper
/// - `Display` is the single-line short form `[<severity>] <code>: <message>`
/// - `source()` is the inner error, so standard chain walkers see the cause
///
/// # Nil Handles
///
/// Code that holds an optional fault can use [`MaybeFault`], whose mutators
/// are no-ops on `None`.
#[derive(Clone, Debug)]
#[must_use = "faults should be returned, displayed or raised"]
pub struct Fault {
    severity: SeverityLevel,
    code: Arc<dyn ErrorCoder>,
    message: Cow<'static, str>,
    info: Option<Info>,
}

impl Fault {
    /// Create a fault with severity ERROR and fresh info.
    #[inline]
    pub fn new<C: ErrorCoder>(code: C, message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_severity(SeverityLevel::Error, code, message)
    }

    /// Create a fault with a caller-chosen severity and fresh info.
    #[inline]
    pub fn with_severity<C: ErrorCoder>(
        severity: SeverityLevel,
        code: C,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            severity,
            code: Arc::new(code),
            message: message.into(),
            info: Some(Info::new()),
        }
    }

    /// Create a fault from an arbitrary source error.
    ///
    /// - `None`: message is [`UNKNOWN_FAILURE`], fresh info
    /// - a `Fault`: inherits its message and takes over its info
    /// - anything else: the error's text becomes the message, fresh info
    ///
    /// The result is always severity ERROR.
    pub fn from_error<C: ErrorCoder>(code: C, source: Option<BoxError>) -> Self {
        let (message, info) = match source {
            None => (Cow::Borrowed(UNKNOWN_FAILURE), Info::new()),
            Some(source) => match source.downcast::<Fault>() {
                Ok(mut fault) => {
                    let info = fault.info.take().unwrap_or_else(Info::new);
                    (std::mem::take(&mut fault.message), info)
                }
                Err(foreign) => (Cow::Owned(foreign.to_string()), Info::new()),
            },
        };

        Self {
            severity: SeverityLevel::Error,
            code: Arc::new(code),
            message,
            info: Some(info),
        }
    }

    /// Shorthand for [`from_error`](Self::from_error) with a present source.
    #[inline]
    pub fn wrap<C: ErrorCoder>(code: C, source: impl Into<BoxError>) -> Self {
        Self::from_error(code, Some(source.into()))
    }

    /// Wrap a fault the caller keeps a handle to.
    ///
    /// The new fault inherits the message and takes the info; `inner` is left
    /// without info so the same diagnostics are never reachable through two
    /// handles.
    pub fn from_fault<C: ErrorCoder>(code: C, inner: &mut Fault) -> Self {
        let info = inner.info.take().unwrap_or_else(Info::new);
        Self {
            severity: SeverityLevel::Error,
            code: Arc::new(code),
            message: inner.message.clone(),
            info: Some(info),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Severity level.
    #[inline]
    pub const fn severity(&self) -> SeverityLevel {
        self.severity
    }

    /// Error code.
    #[inline]
    pub fn code(&self) -> &dyn ErrorCoder {
        self.code.as_ref()
    }

    /// Raw message; empty when none was provided.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached info, absent after it was handed to a wrapping fault.
    #[inline]
    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    /// Detach the info.
    #[inline]
    pub fn take_info(&mut self) -> Option<Info> {
        self.info.take()
    }

    /// Whether the code has the same concrete type and value as `code`.
    #[inline]
    pub fn is<C: ErrorCoder>(&self, code: C) -> bool {
        code_matches(self.code(), &code)
    }

    #[inline]
    fn info_mut(&mut self) -> &mut Info {
        self.info.get_or_insert_with(Info::new)
    }

    // ------------------------------------------------------------------------
    // Enrichment
    // ------------------------------------------------------------------------

    /// Overwrite the severity.
    #[inline]
    pub fn change_severity(&mut self, level: SeverityLevel) {
        self.severity = level;
    }

    /// Append a suggestion. Order is kept, duplicates are allowed.
    #[inline]
    pub fn add_suggestion(&mut self, suggestion: impl Into<Cow<'static, str>>) {
        self.info_mut().add_suggestion(suggestion);
    }

    /// Insert or replace a context value.
    #[inline]
    pub fn add_context<V>(&mut self, key: impl Into<Cow<'static, str>>, value: V)
    where
        V: Any + fmt::Display + Send + Sync,
    {
        self.info_mut().add_context(key, value);
    }

    /// Append a stack frame. Blank labels are ignored.
    #[inline]
    pub fn add_frame(&mut self, frame: impl Into<Cow<'static, str>>) {
        self.info_mut().add_frame(frame);
    }

    /// Replace the inner error.
    #[inline]
    pub fn set_inner(&mut self, inner: impl Into<BoxError>) {
        self.info_mut().set_inner(inner);
    }

    /// Remove the inner error.
    #[inline]
    pub fn clear_inner(&mut self) -> Option<SharedError> {
        self.info.as_mut().and_then(Info::clear_inner)
    }

    /// Look up a context value.
    #[inline]
    pub fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.info.as_ref()?.entry(key).map(ContextEntry::value)
    }

    /// Look up a context value of a known type.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` when the key is absent, or when it holds a value of another
    /// type (with a suggestion naming that type).
    pub fn value_as<T: Any>(&self, key: &str) -> Result<&T> {
        let Some(entry) = self.info.as_ref().and_then(|info| info.entry(key)) else {
            return Err(definitions::no_such_key(key));
        };

        entry.value().downcast_ref::<T>().ok_or_else(|| {
            let mut fault = definitions::no_such_key(key);
            fault.add_suggestion(format!(
                "Found a key with the same name but has a value of type {}",
                entry.type_label()
            ));
            fault
        })
    }

    // ------------------------------------------------------------------------
    // Builder forms
    // ------------------------------------------------------------------------

    /// Builder form of [`change_severity`](Self::change_severity).
    #[inline]
    pub fn with_severity_level(mut self, level: SeverityLevel) -> Self {
        self.change_severity(level);
        self
    }

    /// Builder form of [`add_suggestion`](Self::add_suggestion).
    #[inline]
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'static, str>>) -> Self {
        self.add_suggestion(suggestion);
        self
    }

    /// Builder form of [`add_context`](Self::add_context).
    #[inline]
    pub fn with_context<V>(mut self, key: impl Into<Cow<'static, str>>, value: V) -> Self
    where
        V: Any + fmt::Display + Send + Sync,
    {
        self.add_context(key, value);
        self
    }

    /// Builder form of [`add_frame`](Self::add_frame).
    #[inline]
    pub fn with_frame(mut self, frame: impl Into<Cow<'static, str>>) -> Self {
        self.add_frame(frame);
        self
    }

    /// Builder form of [`set_inner`](Self::set_inner).
    #[inline]
    pub fn with_inner(mut self, inner: impl Into<BoxError>) -> Self {
        self.set_inner(inner);
        self
    }

    // ------------------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------------------

    /// Borrowed structured view for log pipelines.
    ///
    /// The view cannot outlive the fault.
    #[inline]
    pub fn log(&self) -> FaultLog<'_> {
        FaultLog::new(self)
    }

    /// Callback form of [`log`](Self::log).
    #[inline]
    pub fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&FaultLog<'_>) -> R,
    {
        let log = self.log();
        f(&log)
    }
}

impl fmt::Display for Fault {
    /// Short form: `[<severity>] <code>: <message>`. Never contains a newline
    /// unless the message itself does.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = if self.message.is_empty() {
            NO_MESSAGE
        } else {
            self.message.as_ref()
        };
        write!(f, "[{}] {}: {}", self.severity, self.code, message)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.info
            .as_ref()?
            .inner()
            .map(|inner| inner as &(dyn Error + 'static))
    }
}

// ============================================================================
// Optional Handles
// ============================================================================

/// Nil-safe operations on an optional fault.
///
/// Every mutator is a no-op when the handle is `None`, and
/// [`error_text`](Self::error_text) renders `None` as the empty string.
///
/// ```rust
/// use bulwark_errors::{ErrorCode, Fault, MaybeFault};
///
/// let mut missing: Option<Fault> = None;
/// missing.add_suggestion("ignored");
/// assert_eq!(missing.error_text(), "");
///
/// let mut present = Some(Fault::new(ErrorCode::InvalidUsage, "bad call"));
/// present.add_frame("caller");
/// assert_eq!(present.error_text(), "[ERROR] InvalidUsage: bad call");
/// ```
pub trait MaybeFault {
    /// Shared access to the fault, if present.
    fn fault_ref(&self) -> Option<&Fault>;

    /// Exclusive access to the fault, if present.
    fn fault_mut(&mut self) -> Option<&mut Fault>;

    /// Short form, or `""` when absent.
    fn error_text(&self) -> String {
        self.fault_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// See [`Fault::change_severity`].
    fn change_severity(&mut self, level: SeverityLevel) {
        if let Some(fault) = self.fault_mut() {
            fault.change_severity(level);
        }
    }

    /// See [`Fault::add_suggestion`].
    fn add_suggestion(&mut self, suggestion: impl Into<Cow<'static, str>>) {
        if let Some(fault) = self.fault_mut() {
            fault.add_suggestion(suggestion);
        }
    }

    /// See [`Fault::add_context`].
    fn add_context<V>(&mut self, key: impl Into<Cow<'static, str>>, value: V)
    where
        V: Any + fmt::Display + Send + Sync,
    {
        if let Some(fault) = self.fault_mut() {
            fault.add_context(key, value);
        }
    }

    /// See [`Fault::add_frame`].
    fn add_frame(&mut self, frame: impl Into<Cow<'static, str>>) {
        if let Some(fault) = self.fault_mut() {
            fault.add_frame(frame);
        }
    }

    /// See [`Fault::set_inner`].
    fn set_inner(&mut self, inner: impl Into<BoxError>) {
        if let Some(fault) = self.fault_mut() {
            fault.set_inner(inner);
        }
    }

    /// See [`Fault::value`].
    fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.fault_ref()?.value(key)
    }
}

impl MaybeFault for Option<Fault> {
    #[inline]
    fn fault_ref(&self) -> Option<&Fault> {
        self.as_ref()
    }

    #[inline]
    fn fault_mut(&mut self) -> Option<&mut Fault> {
        self.as_mut()
    }
}

impl MaybeFault for Option<&mut Fault> {
    #[inline]
    fn fault_ref(&self) -> Option<&Fault> {
        self.as_deref()
    }

    #[inline]
    fn fault_mut(&mut self) -> Option<&mut Fault> {
        self.as_deref_mut()
    }
}
