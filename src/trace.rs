//! Human-readable stack traces.
//!
//! A trace is a list of frame labels appended as a fault travels through the
//! call chain. Frames are rendered in the order they were added, joined with
//! [`FRAME_SEPARATOR`].

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

/// Separator placed between frames when a trace is rendered.
pub const FRAME_SEPARATOR: &str = " -> ";

/// Ordered sequence of non-empty, whitespace-trimmed frame labels.
///
/// Owned frame text is zeroized on drop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackTrace {
    frames: SmallVec<[Cow<'static, str>; 4]>,
}

impl StackTrace {
    /// Create an empty trace.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    ///
    /// The label is trimmed first; empty or whitespace-only labels are ignored.
    /// Returns whether the frame was added.
    pub fn push(&mut self, frame: impl Into<Cow<'static, str>>) -> bool {
        let frame = match frame.into() {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
            Cow::Owned(s) if s.trim().len() == s.len() => Cow::Owned(s),
            Cow::Owned(mut s) => {
                let trimmed = s.trim().to_owned();
                s.zeroize();
                Cow::Owned(trimmed)
            }
        };

        if frame.is_empty() {
            return false;
        }

        self.frames.push(frame);
        true
    }

    /// Frames in append order.
    #[inline]
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.frames.iter().map(|f| f.as_ref())
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the trace holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str(FRAME_SEPARATOR)?;
            }
            f.write_str(frame)?;
        }
        Ok(())
    }
}

impl Zeroize for StackTrace {
    fn zeroize(&mut self) {
        for frame in &mut self.frames {
            if let Cow::Owned(s) = frame {
                s.zeroize();
            }
        }
        self.frames.clear();
    }
}

impl Drop for StackTrace {
    fn drop(&mut self) {
        self.zeroize();
    }
}
