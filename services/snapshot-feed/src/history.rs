//! Append-only snapshot history
//!
//! Every accepted snapshot is kept in ingestion order under a single lock,
//! and each entry receives the next sequence number. Identical payloads
//! are separate entries.
//!
//! Without a capacity the history grows for the life of the process (one
//! entry per ingested snapshot). With a capacity the oldest entries are
//! dropped once it is reached; sequence numbers are never reused.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use types::snapshot::MarketSnapshot;

/// One stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub snapshot: Arc<MarketSnapshot>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<HistoryEntry>,
    next_sequence: u64,
}

/// Ingestion-ordered log of snapshots. Sequences start at 1.
#[derive(Debug, Default)]
pub struct SnapshotHistory {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
}

impl SnapshotHistory {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::default(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a snapshot and return its sequence number.
    pub fn append(&self, snapshot: Arc<MarketSnapshot>) -> u64 {
        let mut inner = self.lock();
        inner.next_sequence += 1;
        let sequence = inner.next_sequence;
        if self.capacity.is_some_and(|cap| inner.entries.len() >= cap) {
            inner.entries.pop_front();
        }
        inner.entries.push_back(HistoryEntry { sequence, snapshot });
        sequence
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn latest(&self) -> Option<HistoryEntry> {
        self.lock().entries.back().cloned()
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        let inner = self.lock();
        let start = inner.entries.len().saturating_sub(n);
        inner.entries.range(start..).cloned().collect()
    }

    /// Entry with `sequence`, if it is still retained.
    pub fn get(&self, sequence: u64) -> Option<HistoryEntry> {
        let inner = self.lock();
        let first = inner.entries.front()?.sequence;
        let idx = usize::try_from(sequence.checked_sub(first)?).ok()?;
        inner.entries.get(idx).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::snapshot::parse_timestamp;

    fn snapshot(symbol: &str) -> Arc<MarketSnapshot> {
        let ts = parse_timestamp("2024-05-01T09:30:00Z").unwrap();
        Arc::new(MarketSnapshot::new("screen_capture", ts).with_symbol(symbol))
    }

    #[test]
    fn test_append_assigns_increasing_sequences() {
        let history = SnapshotHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.append(snapshot("A")), 1);
        assert_eq!(history.append(snapshot("B")), 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().snapshot.symbol(), Some("B"));
    }

    #[test]
    fn test_identical_snapshots_are_separate_entries() {
        let history = SnapshotHistory::new();
        let snap = snapshot("A");
        history.append(snap.clone());
        history.append(snap);
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).unwrap().snapshot, history.get(2).unwrap().snapshot);
    }

    #[test]
    fn test_recent_and_get() {
        let history = SnapshotHistory::new();
        for s in ["A", "B", "C"] {
            history.append(snapshot(s));
        }
        let recent = history.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sequence, 2);
        assert_eq!(recent[1].sequence, 3);
        assert_eq!(history.recent(10).len(), 3);
        assert!(history.get(0).is_none());
        assert!(history.get(4).is_none());
    }

    #[test]
    fn test_capacity_drops_oldest_entries() {
        let history = SnapshotHistory::with_capacity(Some(2));
        for s in ["A", "B", "C"] {
            history.append(snapshot(s));
        }

        assert_eq!(history.len(), 2);
        assert!(history.get(1).is_none());
        assert_eq!(history.get(2).unwrap().snapshot.symbol(), Some("B"));
        assert_eq!(history.get(3).unwrap().snapshot.symbol(), Some("C"));
        assert_eq!(history.append(snapshot("D")), 4);
        assert_eq!(history.recent(10).iter().map(|e| e.sequence).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let history = SnapshotHistory::with_capacity(Some(0));
        history.append(snapshot("A"));
        history.append(snapshot("B"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().sequence, 2);
    }

    #[test]
    fn test_concurrent_appends_keep_every_entry() {
        let history = Arc::new(SnapshotHistory::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        history.append(snapshot("X"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let all = history.recent(usize::MAX);
        assert_eq!(all.len(), 400);
        assert!(all.windows(2).all(|w| w[1].sequence == w[0].sequence + 1));
    }
}
