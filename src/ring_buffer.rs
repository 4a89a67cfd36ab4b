//! Bounded journal of faults.
//!
//! Keeps the most recent faults in a fixed-size buffer with FIFO eviction, so
//! a burst of failures (or a long-running process that raises many of them)
//! never grows memory without bound.
//!
//! # Design Principles
//!
//! - **Bounded memory**: fixed number of entries, each capped in bytes
//! - **FIFO eviction**: the oldest entry is dropped first
//! - **RwLock-based**: concurrent readers, exclusive writers
//! - **Cheap reads**: entry text is `Arc<str>`, so cloning an entry only bumps
//!   reference counts
//!
//! # Example
//!
//! ```rust
//! use bulwark_errors::{ErrorCode, Fault, RingBufferLogger, SeverityLevel};
//!
//! let journal = RingBufferLogger::new(100, 2048);
//!
//! journal.log(&Fault::new(ErrorCode::OperationFail, "disk full"));
//! journal.log(&Fault::with_severity(SeverityLevel::Fatal, ErrorCode::AssertFail, "x > 0"));
//!
//! let fatal = journal.get_filtered(|e| e.severity == SeverityLevel::Fatal);
//! assert_eq!(fatal.len(), 1);
//! assert_eq!(journal.get_recent(1)[0].message.as_ref(), "x > 0");
//! ```

use crate::context::Info;
use crate::display::display_error;
use crate::{Fault, SeverityLevel};
use chrono::Utc;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Share of an entry's byte budget available to the message.
const MESSAGE_CAP: usize = 512;

/// A single journal entry with bounded size.
#[derive(Clone, Debug)]
pub struct JournalEntry {
    /// Unix timestamp (seconds) of the fault's info, or of logging time.
    pub timestamp: i64,
    /// Severity at logging time.
    pub severity: SeverityLevel,
    /// Code string form, e.g. `AssertFail`.
    pub code: Arc<str>,
    /// Message, possibly truncated.
    pub message: Arc<str>,
    /// Full multi-line rendering, possibly truncated.
    pub text: Arc<str>,
    /// Bytes of message plus text.
    pub size_bytes: usize,
}

/// Journal with bounded memory usage.
///
/// Clones share the same storage and eviction counter.
#[derive(Clone)]
pub struct RingBufferLogger {
    entries: Arc<RwLock<VecDeque<JournalEntry>>>,
    max_entries: usize,
    max_entry_bytes: usize,
    eviction_count: Arc<AtomicU64>,
}

impl RingBufferLogger {
    /// Create a journal.
    ///
    /// * `max_entries` - entries kept before FIFO eviction (at least 1)
    /// * `max_entry_bytes` - cap on message plus rendered text per entry
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_entries))),
            max_entries,
            max_entry_bytes,
            eviction_count: Arc::new(AtomicU64::new(0)),
        }
    }

    // A panic while holding the lock leaves the deque intact, so poisoning
    // is ignored.
    fn entries(&self) -> RwLockReadGuard<'_, VecDeque<JournalEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, VecDeque<JournalEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a fault, evicting the oldest entry when full.
    pub fn log(&self, fault: &Fault) {
        let entry = self.create_entry(fault);

        let mut entries = self.entries_mut();
        if entries.len() >= self.max_entries {
            entries.pop_front();
            self.eviction_count.fetch_add(1, Ordering::Relaxed);
        }
        entries.push_back(entry);
    }

    /// Build a bounded entry. The message gets at most half a kilobyte (or
    /// the whole budget if smaller); the rendering gets what is left.
    fn create_entry(&self, fault: &Fault) -> JournalEntry {
        let mut rendered = Vec::new();
        // A Vec accepts every byte, so rendering cannot fail.
        let _ = display_error(Some(&mut rendered), Some(fault));
        let rendered = String::from_utf8_lossy(&rendered);

        let mut remaining = self.max_entry_bytes;

        let message = truncate_to_bytes(fault.message(), remaining.min(MESSAGE_CAP));
        remaining = remaining.saturating_sub(message.len());

        let text = truncate_to_bytes(&rendered, remaining);

        let timestamp = fault
            .info()
            .and_then(Info::timestamp)
            .unwrap_or_else(Utc::now)
            .timestamp();

        JournalEntry {
            timestamp,
            severity: fault.severity(),
            code: Arc::from(fault.code().to_string()),
            size_bytes: message.len() + text.len(),
            message: Arc::from(message.as_ref()),
            text: Arc::from(text.as_ref()),
        }
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<JournalEntry> {
        self.entries().iter().rev().take(count).cloned().collect()
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<JournalEntry> {
        self.entries().iter().rev().cloned().collect()
    }

    /// Entries matching a predicate, oldest first.
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<JournalEntry>
    where
        F: Fn(&JournalEntry) -> bool,
    {
        self.entries().iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the journal holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes across entries.
    pub fn payload_bytes(&self) -> usize {
        self.entries().iter().map(|e| e.size_bytes).sum()
    }

    /// Evictions since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    /// Drop every entry. The eviction counter is kept.
    pub fn clear(&self) {
        self.entries_mut().clear();
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Whether the next insert will evict.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

impl fmt::Debug for RingBufferLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBufferLogger")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .field("evictions", &self.eviction_count())
            .finish()
    }
}

/// Truncate to at most `max_bytes`, respecting UTF-8 boundaries.
///
/// Borrows when no truncation is needed.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if max_bytes == 0 {
        return Cow::Borrowed("");
    }
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }

    let indicator = "...[TRUNC]";
    if max_bytes <= indicator.len() {
        return Cow::Borrowed(&indicator[..max_bytes]);
    }
    let max_content = max_bytes - indicator.len();

    let mut idx = max_content;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(indicator);
    }

    let mut out = String::with_capacity(idx + indicator.len());
    out.push_str(&s[..idx]);
    out.push_str(indicator);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    fn fault(i: usize) -> Fault {
        Fault::new(ErrorCode::OperationFail, format!("error {i}"))
    }

    #[test]
    fn evicts_oldest() {
        let journal = RingBufferLogger::new(3, 1024);
        for i in 0..5 {
            journal.log(&fault(i));
        }

        assert_eq!(journal.len(), 3);
        assert!(journal.is_full());
        assert_eq!(journal.eviction_count(), 2);

        let entries = journal.get_all();
        assert_eq!(entries[0].message.as_ref(), "error 4");
        assert_eq!(entries[2].message.as_ref(), "error 2");
    }

    #[test]
    fn entry_carries_rendering() {
        let journal = RingBufferLogger::new(4, 4096);
        let f = Fault::new(ErrorCode::NoSuchKey, "missing")
            .with_suggestion("check spelling")
            .with_frame("lookup");
        journal.log(&f);

        let entry = &journal.get_recent(1)[0];
        assert_eq!(entry.code.as_ref(), "NoSuchKey");
        assert_eq!(entry.severity, SeverityLevel::Error);
        assert!(entry.text.starts_with("[ERROR] NoSuchKey: missing\n"));
        assert!(entry.text.contains("- check spelling"));
        assert!(entry.text.contains("Stack trace:\n- lookup"));
        assert_eq!(
            entry.timestamp,
            f.info().and_then(Info::timestamp).map(|ts| ts.timestamp()).unwrap()
        );
    }

    #[test]
    fn respects_entry_size_limit() {
        let journal = RingBufferLogger::new(10, 128);
        journal.log(&Fault::new(ErrorCode::OperationFail, "A".repeat(10_000)));

        let entry = &journal.get_recent(1)[0];
        assert!(entry.size_bytes <= 128);
        assert!(entry.message.contains("TRUNC"));
        assert_eq!(journal.payload_bytes(), entry.size_bytes);
    }

    #[test]
    fn filtering_by_severity() {
        let journal = RingBufferLogger::new(100, 1024);
        for i in 0..10 {
            let mut f = fault(i);
            if i % 2 == 0 {
                f.change_severity(SeverityLevel::Fatal);
            }
            journal.log(&f);
        }

        let fatal = journal.get_filtered(|e| e.severity == SeverityLevel::Fatal);
        assert_eq!(fatal.len(), 5);
        assert_eq!(fatal[0].message.as_ref(), "error 0");
    }

    #[test]
    fn clone_shares_state() {
        let first = RingBufferLogger::new(100, 1024);
        let second = first.clone();

        first.log(&fault(0));
        assert_eq!(second.len(), 1);

        second.clear();
        assert!(first.is_empty());
        assert_eq!(first.capacity(), 100);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let journal = RingBufferLogger::new(2, 1024);
        journal.log(&fault(0));

        let poisoner = journal.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries_mut();
            panic!("poison the journal");
        })
        .join();

        journal.log(&fault(1));
        journal.log(&fault(2));
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.eviction_count(), 1);
        assert_eq!(journal.get_recent(1)[0].message.as_ref(), "error 2");
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let journal = RingBufferLogger::new(0, 64);
        journal.log(&fault(1));
        journal.log(&fault(2));
        assert_eq!(journal.capacity(), 1);
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.eviction_count(), 1);
    }

    #[test]
    fn truncate_respects_utf8() {
        let emoji = "🔥".repeat(100);
        let truncated = truncate_to_bytes(&emoji, 50);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
        assert!(truncated.len() <= 50);
    }

    #[test]
    fn truncate_borrows_when_short() {
        let truncated = truncate_to_bytes("short", 100);
        assert!(matches!(truncated, Cow::Borrowed("short")));
    }

    #[test]
    fn concurrent_logging() {
        use std::thread;

        let journal = RingBufferLogger::new(128, 256);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let journal = journal.clone();
                thread::spawn(move || {
                    for j in 0..100 {
                        journal.log(&fault(t * 1000 + j));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(journal.len(), 128);
        assert_eq!(journal.eviction_count(), 800 - 128);
    }

    #[test]
    fn cloned_entries_share_text() {
        let journal = RingBufferLogger::new(10, 1024);
        journal.log(&fault(7));

        let a = journal.get_recent(1)[0].clone();
        let b = journal.get_recent(1)[0].clone();
        assert!(Arc::ptr_eq(&a.text, &b.text));
        assert!(Arc::ptr_eq(&a.message, &b.message));
    }
}
