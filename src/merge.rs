//! Combining diagnostics when one error wraps another.
//!
//! Merging is deliberately shallow: when both sides carry an [`Info`], the
//! outer one wins as a whole. Suggestions, context and frames are not
//! interleaved.

use crate::context::Info;
use crate::{BoxError, Fault};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Two non-structured errors joined as `outer: inner`.
///
/// Produced by [`merge_errors`] when neither side is a [`Fault`]. The inner
/// half is the `source()`; both halves stay reachable through the accessors,
/// and [`classify`](crate::classify) searches both.
#[derive(Debug)]
pub struct JoinedError {
    outer: BoxError,
    inner: BoxError,
}

impl JoinedError {
    /// Join two errors.
    pub fn new(outer: impl Into<BoxError>, inner: impl Into<BoxError>) -> Self {
        Self {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    /// The wrapping half.
    #[inline]
    pub fn outer(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.outer.as_ref()
    }

    /// The wrapped half.
    #[inline]
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Split back into `(outer, inner)`.
    pub fn into_parts(self) -> (BoxError, BoxError) {
        (self.outer, self.inner)
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.outer, self.inner)
    }
}

impl Error for JoinedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Merge two infos.
///
/// | outer | inner | result |
/// |---|---|---|
/// | any | `None` | copy of outer, or a fresh info when outer is absent |
/// | `Some` | `Some` | copy of outer |
/// | `None` | `Some` | copy of inner |
pub fn merge_info(outer: Option<&Info>, inner: Option<&Info>) -> Info {
    match (outer, inner) {
        (Some(outer), _) => outer.copy(),
        (None, Some(inner)) => inner.copy(),
        (None, None) => Info::new(),
    }
}

/// Merge two errors into one.
///
/// - either side absent: the other is returned unchanged (same box)
/// - neither side a [`Fault`]: a [`JoinedError`]
/// - otherwise a new [`Fault`] taking severity, code and message from the
///   outer when it is a fault (else from the inner), with
///   [`merge_info`] of both infos
///
/// ```rust
/// use bulwark_errors::{BoxError, ErrorCode, Fault, merge_errors};
///
/// let outer: BoxError = Fault::new(ErrorCode::OperationFail, "save failed").into();
/// let inner: BoxError = std::io::Error::other("disk full").into();
///
/// let merged = merge_errors(Some(outer), Some(inner)).unwrap();
/// assert_eq!(merged.to_string(), "[ERROR] OperationFail: save failed");
/// ```
pub fn merge_errors(outer: Option<BoxError>, inner: Option<BoxError>) -> Option<BoxError> {
    let (outer, inner) = match (outer, inner) {
        (None, inner) => return inner,
        (outer, None) => return outer,
        (Some(outer), Some(inner)) => (outer, inner),
    };

    let merged = {
        let outer_fault = outer.downcast_ref::<Fault>();
        let inner_fault = inner.downcast_ref::<Fault>();

        outer_fault.or(inner_fault).map(|head| Fault {
            severity: head.severity,
            code: Arc::clone(&head.code),
            message: head.message.clone(),
            info: Some(merge_info(
                outer_fault.and_then(Fault::info),
                inner_fault.and_then(Fault::info),
            )),
        })
    };

    match merged {
        Some(fault) => Some(Box::new(fault)),
        None => Some(Box::new(JoinedError { outer, inner })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCode, SeverityLevel};
    use std::io;

    fn boxed(fault: Fault) -> BoxError {
        Box::new(fault)
    }

    #[test]
    fn merge_info_prefers_outer() {
        let mut outer = Info::new();
        outer.add_suggestion("outer hint");
        let mut inner = Info::new();
        inner.add_suggestion("inner hint");
        inner.add_context("k", 1);

        let merged = merge_info(Some(&outer), Some(&inner));
        assert_eq!(merged.suggestions().collect::<Vec<_>>(), vec!["outer hint"]);
        assert!(merged.entry("k").is_none());
    }

    #[test]
    fn merge_info_falls_back() {
        let mut inner = Info::new();
        inner.add_suggestion("inner hint");

        let merged = merge_info(None, Some(&inner));
        assert_eq!(merged.suggestions().collect::<Vec<_>>(), vec!["inner hint"]);

        let fresh = merge_info(None, None);
        assert!(fresh.timestamp().is_some());
        assert_eq!(fresh.suggestions().count(), 0);
    }

    #[test]
    fn absent_side_returns_other_unchanged() {
        let e: BoxError = Box::new(io::Error::other("only"));
        let ptr = &*e as *const (dyn Error + Send + Sync) as *const ();
        let back = merge_errors(None, Some(e)).unwrap();
        assert_eq!(&*back as *const (dyn Error + Send + Sync) as *const (), ptr);

        let e: BoxError = Box::new(io::Error::other("only"));
        let ptr = &*e as *const (dyn Error + Send + Sync) as *const ();
        let back = merge_errors(Some(e), None).unwrap();
        assert_eq!(&*back as *const (dyn Error + Send + Sync) as *const (), ptr);

        assert!(merge_errors(None, None).is_none());
    }

    #[test]
    fn foreign_errors_are_joined() {
        let merged = merge_errors(
            Some(Box::new(io::Error::other("outer"))),
            Some(Box::new(io::Error::other("inner"))),
        )
        .unwrap();

        assert_eq!(merged.to_string(), "outer: inner");
        assert_eq!(merged.source().unwrap().to_string(), "inner");

        let joined = merged.downcast::<JoinedError>().unwrap();
        assert_eq!(joined.outer().to_string(), "outer");
        let (outer, inner) = joined.into_parts();
        assert_eq!(outer.to_string(), "outer");
        assert_eq!(inner.to_string(), "inner");
    }

    #[test]
    fn outer_fault_wins_head_and_info() {
        let outer = Fault::with_severity(SeverityLevel::Warning, ErrorCode::OperationFail, "outer")
            .with_suggestion("from outer");
        let inner = Fault::new(ErrorCode::BadParameter, "inner").with_suggestion("from inner");

        let merged = merge_errors(Some(boxed(outer)), Some(boxed(inner))).unwrap();
        let fault = merged.downcast_ref::<Fault>().unwrap();

        assert_eq!(fault.severity(), SeverityLevel::Warning);
        assert!(fault.is(ErrorCode::OperationFail));
        assert_eq!(fault.message(), "outer");
        assert_eq!(
            fault.info().unwrap().suggestions().collect::<Vec<_>>(),
            vec!["from outer"]
        );
    }

    #[test]
    fn inner_fault_supplies_head_when_outer_is_foreign() {
        let inner = Fault::with_severity(SeverityLevel::Fatal, ErrorCode::NoSuchKey, "inner")
            .with_context("key", "port");

        let merged = merge_errors(Some(Box::new(io::Error::other("outer"))), Some(boxed(inner)))
            .unwrap();
        let fault = merged.downcast_ref::<Fault>().unwrap();

        assert_eq!(fault.severity(), SeverityLevel::Fatal);
        assert!(fault.is(ErrorCode::NoSuchKey));
        assert_eq!(fault.message(), "inner");
        assert!(fault.value("key").is_some());
    }
}
