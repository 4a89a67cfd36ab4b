//! Diagnostic sink configuration (per thread).
//!
//! Before an assertion helper panics, it renders its fault with
//! [`display_error`](crate::display_error) to the current thread's diagnostic
//! sink. The sink is thread-local: tests that silence or capture diagnostics
//! never affect other threads.
//!
//! | Sink | Behavior |
//! |---|---|
//! | [`DiagnosticSink::Stderr`] | full multi-line rendering on standard error (default) |
//! | [`DiagnosticSink::Silent`] | nothing is written |
//! | [`DiagnosticSink::Journal`] | the fault is recorded in a [`RingBufferLogger`] |
//!
//! # Example
//!
//! ```rust
//! use bulwark_errors::config::{self, DiagnosticSink};
//! use bulwark_errors::RingBufferLogger;
//!
//! let journal = RingBufferLogger::new(16, 2048);
//! config::set_diagnostic_sink(DiagnosticSink::Journal(journal.clone()));
//!
//! let outcome = std::panic::catch_unwind(|| bulwark_errors::assert::cond(false, "x > 0"));
//! assert!(outcome.is_err());
//! assert_eq!(journal.len(), 1);
//!
//! config::reset_diagnostic_sink();
//! ```

use crate::display::display_error;
use crate::{Fault, RingBufferLogger};
use std::cell::RefCell;
use std::io;

// Each thread starts on stderr and never sees another thread's choice.
thread_local! {
    static DIAGNOSTIC_SINK: RefCell<DiagnosticSink> = const { RefCell::new(DiagnosticSink::Stderr) };
}

/// Where assertion diagnostics go.
#[derive(Clone, Debug, Default)]
pub enum DiagnosticSink {
    /// Write the full rendering to standard error.
    #[default]
    Stderr,
    /// Discard diagnostics. The panic still happens.
    Silent,
    /// Record the fault in a journal. Clones of the logger share storage.
    Journal(RingBufferLogger),
}

/// Install a sink for the current thread, returning the previous one.
#[inline]
pub fn set_diagnostic_sink(sink: DiagnosticSink) -> DiagnosticSink {
    DIAGNOSTIC_SINK.with(|current| current.replace(sink))
}

/// The current thread's sink.
#[inline]
pub fn diagnostic_sink() -> DiagnosticSink {
    DIAGNOSTIC_SINK.with(|current| current.borrow().clone())
}

/// Revert the current thread to [`DiagnosticSink::Stderr`].
#[inline]
pub fn reset_diagnostic_sink() {
    set_diagnostic_sink(DiagnosticSink::Stderr);
}

/// Run `f` with `sink` installed, restoring the previous sink afterwards.
///
/// The previous sink is restored even if `f` panics.
pub fn with_diagnostic_sink<R>(sink: DiagnosticSink, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<DiagnosticSink>);

    impl Drop for Restore {
        fn drop(&mut self) {
            if let Some(previous) = self.0.take() {
                set_diagnostic_sink(previous);
            }
        }
    }

    let _restore = Restore(Some(set_diagnostic_sink(sink)));
    f()
}

/// Deliver a fault to the current thread's sink.
///
/// Rendering failures are ignored; the caller is about to panic anyway.
pub(crate) fn emit(fault: &Fault) {
    // Clone out first so a journal that panics cannot leave the cell borrowed.
    match diagnostic_sink() {
        DiagnosticSink::Stderr => {
            let mut stderr = io::stderr().lock();
            let _ = display_error(Some(&mut stderr), Some(fault));
        }
        DiagnosticSink::Silent => {}
        DiagnosticSink::Journal(journal) => journal.log(fault),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn default_is_stderr() {
        reset_diagnostic_sink();
        assert!(matches!(diagnostic_sink(), DiagnosticSink::Stderr));
    }

    #[test]
    fn set_returns_previous() {
        reset_diagnostic_sink();
        let previous = set_diagnostic_sink(DiagnosticSink::Silent);
        assert!(matches!(previous, DiagnosticSink::Stderr));
        assert!(matches!(diagnostic_sink(), DiagnosticSink::Silent));
        reset_diagnostic_sink();
    }

    #[test]
    fn journal_sink_records_faults() {
        let journal = RingBufferLogger::new(4, 1024);
        with_diagnostic_sink(DiagnosticSink::Journal(journal.clone()), || {
            emit(&Fault::new(ErrorCode::AssertFail, "first"));
            emit(&Fault::new(ErrorCode::AssertFail, "second"));
        });

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.get_recent(1)[0].message.as_ref(), "second");
    }

    #[test]
    fn scoped_sink_is_restored_after_panic() {
        reset_diagnostic_sink();
        let outcome = std::panic::catch_unwind(|| {
            with_diagnostic_sink(DiagnosticSink::Silent, || panic!("inside"));
        });
        assert!(outcome.is_err());
        assert!(matches!(diagnostic_sink(), DiagnosticSink::Stderr));
    }

    #[test]
    fn sink_is_thread_local() {
        set_diagnostic_sink(DiagnosticSink::Silent);

        let child_is_stderr = std::thread::spawn(|| matches!(diagnostic_sink(), DiagnosticSink::Stderr))
            .join()
            .expect("thread should not panic");

        // Child thread starts from the default.
        assert!(child_is_stderr);
        assert!(matches!(diagnostic_sink(), DiagnosticSink::Silent));
        reset_diagnostic_sink();
    }
}
