//! Bounded transition log
//!
//! Append-only ring of step-stamped messages shown in the renderer's console
//! window. Inserting at capacity drops exactly the oldest entry, which keeps
//! the ring bounded because insertions are also one-at-a-time.

use serde::Serialize;
use std::collections::VecDeque;

/// Default number of retained entries, matching the console window height.
pub const DEFAULT_CAPACITY: usize = 10;

/// One log line, stamped with the step counter at the time of insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub step: u64,
    pub message: String,
}

/// Fixed-capacity, drop-oldest message ring.
#[derive(Debug)]
pub struct TraceLog {
    entries: VecDeque<TraceEntry>,
    capacity: usize,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Capacity zero retains nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, evicting the oldest entry when full.
    pub fn push(&mut self, step: u64, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(TraceEntry {
            step,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    /// Owned copy of the retained entries, for snapshots.
    pub fn tail(&self) -> Vec<TraceEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_newest_when_full() {
        let mut log = TraceLog::with_capacity(3);
        for i in 0..5u64 {
            log.push(i, format!("msg {i}"));
        }
        let kept: Vec<u64> = log.entries().map(|e| e.step).collect();
        assert_eq!(kept, vec![2, 3, 4]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut log = TraceLog::with_capacity(4);
        for i in 0..100u64 {
            log.push(i, "x");
            assert!(log.len() <= 4);
        }
    }

    #[test]
    fn zero_capacity_discards_everything() {
        let mut log = TraceLog::with_capacity(0);
        log.push(0, "dropped");
        assert!(log.is_empty());
    }

    #[test]
    fn entries_are_oldest_first() {
        let mut log = TraceLog::with_capacity(10);
        log.push(1, "first");
        log.push(2, "second");
        let tail = log.tail();
        assert_eq!(tail[0].message, "first");
        assert_eq!(tail[1].message, "second");
    }
}
