//! Bounded in-memory command history.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// One recorded command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the line was entered.
    pub at: DateTime<Utc>,
    /// Who entered it.
    pub session: String,
    /// The raw line.
    pub line: String,
}

impl HistoryEntry {
    /// Renders the entry for the console.
    pub fn render(&self) -> String {
        format!("[{}] {}: {}", self.at.format("%H:%M:%S"), self.session, self.line)
    }
}

/// Keeps the most recent `capacity` lines, oldest first.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl HistoryStore {
    /// Creates a store holding at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the maximum number of kept lines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a line, evicting the oldest one when full.
    pub fn push(&self, session: impl Into<String>, line: impl Into<String>) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(HistoryEntry {
            at: Utc::now(),
            session: session.into(),
            line: line.into(),
        });
    }

    /// Returns every entry, most recent first.
    pub fn newest_first(&self) -> Vec<HistoryEntry> {
        self.lock().iter().rev().cloned().collect()
    }

    /// Returns the number of recorded lines.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(100)
    }
}
