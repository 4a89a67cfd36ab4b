//! Diagnostic metadata attached to a [`Fault`](crate::Fault).
//!
//! [`Info`] is the auxiliary bag of a fault:
//!
//! - `suggestions`: ordered hints for the reader (duplicates allowed)
//! - `timestamp`: when the info was created (UTC, never mutated)
//! - `context`: named values, last write wins per key
//! - `stack_trace`: frames added while the fault travels outward
//! - `inner`: the wrapped cause, if any
//!
//! # Memory Model
//!
//! Suggestions, keys and frames use `Cow<'static, str>` so string literals are
//! stored without allocating. Owned text (suggestions, rendered context values,
//! frames) is zeroized on drop. Context values themselves and the inner error
//! are shared behind `Arc`, so copying an `Info` never deep-copies them; they
//! are immutable once attached.
//!
//! # Capacity Choice
//!
//! Most faults carry one or two suggestions and a handful of context entries,
//! so both live inline in a `SmallVec` and spill to the heap only beyond that.

use crate::BoxError;
use crate::trace::StackTrace;
use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

/// Shared, immutable inner error.
pub type SharedError = Arc<dyn Error + Send + Sync>;

// ============================================================================
// Context Entry
// ============================================================================

/// A single context value: the type-erased value plus its rendering.
///
/// The text is captured when the entry is inserted, so display and logging
/// never need to know the concrete type.
#[derive(Clone)]
pub struct ContextEntry {
    value: Arc<dyn Any + Send + Sync>,
    type_label: &'static str,
    rendered: String,
}

impl ContextEntry {
    /// Capture a value and its `Display` rendering.
    pub fn new<V>(value: V) -> Self
    where
        V: Any + fmt::Display + Send + Sync,
    {
        let rendered = value.to_string();
        Self {
            value: Arc::new(value),
            type_label: std::any::type_name::<V>(),
            rendered,
        }
    }

    /// The stored value, for downcasting.
    #[inline]
    pub fn value(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }

    /// Name of the stored value's concrete type.
    #[inline]
    pub fn type_label(&self) -> &'static str {
        self.type_label
    }

    /// Text captured at insertion.
    #[inline]
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Debug for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextEntry")
            .field("type", &self.type_label)
            .field("rendered", &self.rendered)
            .finish()
    }
}

impl Zeroize for ContextEntry {
    fn zeroize(&mut self) {
        self.rendered.zeroize();
    }
}

impl Drop for ContextEntry {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Info
// ============================================================================

/// Auxiliary error metadata owned by a fault.
#[derive(Clone, Debug, Default)]
pub struct Info {
    suggestions: SmallVec<[Cow<'static, str>; 2]>,
    timestamp: Option<DateTime<Utc>>,
    context: SmallVec<[(Cow<'static, str>, ContextEntry); 4]>,
    stack_trace: Option<StackTrace>,
    inner: Option<SharedError>,
}

impl Info {
    /// Fresh info stamped with the current time, with no suggestions, context,
    /// stack trace or inner error.
    ///
    /// `Info::default()` is the same without a timestamp.
    #[inline]
    pub fn new() -> Self {
        let mut info = Self::default();
        info.timestamp = Some(Utc::now());
        info
    }

    /// Shallow copy: suggestions, context entries and frames are duplicated,
    /// context values and the inner error are shared.
    #[inline]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// When this info was created, if stamped.
    #[inline]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Suggestions in insertion order.
    #[inline]
    pub fn suggestions(&self) -> impl ExactSizeIterator<Item = &str> {
        self.suggestions.iter().map(|s| s.as_ref())
    }

    /// Context entries in first-insertion order.
    #[inline]
    pub fn context(&self) -> impl ExactSizeIterator<Item = (&str, &ContextEntry)> {
        self.context.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Stack trace, if any frame was ever added.
    #[inline]
    pub fn stack_trace(&self) -> Option<&StackTrace> {
        self.stack_trace.as_ref()
    }

    /// The wrapped cause.
    #[inline]
    pub fn inner(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.inner.as_deref()
    }

    /// Whether any displayable section is present.
    pub fn has_details(&self) -> bool {
        self.timestamp.is_some()
            || !self.suggestions.is_empty()
            || !self.context.is_empty()
            || self.stack_trace.is_some()
            || self.inner.is_some()
    }

    /// Append a suggestion.
    #[inline]
    pub fn add_suggestion(&mut self, suggestion: impl Into<Cow<'static, str>>) {
        self.suggestions.push(suggestion.into());
    }

    /// Insert or replace a context value.
    pub fn add_context<V>(&mut self, key: impl Into<Cow<'static, str>>, value: V)
    where
        V: Any + fmt::Display + Send + Sync,
    {
        let key = key.into();
        let entry = ContextEntry::new(value);

        match self.context.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.context.push((key, entry)),
        }
    }

    /// Look up a context entry.
    #[inline]
    pub fn entry(&self, key: &str) -> Option<&ContextEntry> {
        self.context
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    /// Append a frame, creating the stack trace on first use.
    ///
    /// Blank frames are ignored and never create an empty trace.
    pub fn add_frame(&mut self, frame: impl Into<Cow<'static, str>>) {
        match self.stack_trace.as_mut() {
            Some(trace) => {
                trace.push(frame);
            }
            None => {
                let mut trace = StackTrace::new();
                if trace.push(frame) {
                    self.stack_trace = Some(trace);
                }
            }
        }
    }

    /// Replace the inner error.
    #[inline]
    pub fn set_inner(&mut self, inner: impl Into<BoxError>) {
        self.inner = Some(Arc::from(inner.into()));
    }

    /// Replace the inner error with an already shared one.
    #[inline]
    pub fn set_shared_inner(&mut self, inner: SharedError) {
        self.inner = Some(inner);
    }

    /// Remove the inner error.
    #[inline]
    pub fn clear_inner(&mut self) -> Option<SharedError> {
        self.inner.take()
    }
}

impl Zeroize for Info {
    fn zeroize(&mut self) {
        for suggestion in &mut self.suggestions {
            if let Cow::Owned(s) = suggestion {
                s.zeroize();
            }
        }
        self.suggestions.clear();

        for (key, entry) in &mut self.context {
            if let Cow::Owned(k) = key {
                k.zeroize();
            }
            entry.zeroize();
        }
        self.context.clear();

        if let Some(trace) = self.stack_trace.as_mut() {
            trace.zeroize();
        }
    }
}

impl Drop for Info {
    fn drop(&mut self) {
        self.zeroize();
    }
}
