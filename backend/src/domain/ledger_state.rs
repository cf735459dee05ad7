//! Ledger state for the debt tracker.
//!
//! Holds the current balance, the instant interest was last charged and the
//! bounded undo history. This module is pure data: it performs no I/O and
//! knows nothing about interest, persistence or the clock.

use shared::SnapshotRecord;
use std::collections::VecDeque;

/// Number of undo steps kept when no configuration says otherwise
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Balance assigned to a brand new ledger
pub const DEFAULT_INITIAL_BALANCE: f64 = 100_000.0;

/// A `(balance, timestamp)` pair captured before a mutating operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    balance: f64,
    timestamp: i64,
}

impl Snapshot {
    pub fn new(balance: f64, timestamp: i64) -> Self {
        Self { balance, timestamp }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl From<SnapshotRecord> for Snapshot {
    fn from(record: SnapshotRecord) -> Self {
        Self::new(record.debt, record.date)
    }
}

impl From<Snapshot> for SnapshotRecord {
    fn from(snapshot: Snapshot) -> Self {
        SnapshotRecord {
            debt: snapshot.balance,
            date: snapshot.timestamp,
        }
    }
}

/// Undo stack, most recent snapshot first, never longer than its bound
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<Snapshot>,
    bound: usize,
}

impl History {
    /// Create an empty history. A bound of zero is raised to one.
    pub fn new(bound: usize) -> Self {
        let bound = bound.max(1);
        Self {
            entries: VecDeque::with_capacity(bound),
            bound,
        }
    }

    /// Build a history from entries ordered most-recent-first.
    ///
    /// Entries beyond the bound are the oldest ones and are dropped.
    pub fn from_entries<I>(entries: I, bound: usize) -> Self
    where
        I: IntoIterator<Item = Snapshot>,
    {
        let mut history = Self::new(bound);
        history.entries.extend(entries.into_iter().take(history.bound));
        history
    }

    /// Push a snapshot at the head, evicting and returning the oldest entry
    /// if the bound would be exceeded.
    pub fn push(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        self.entries.push_front(snapshot);
        if self.entries.len() > self.bound {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Remove and return the most recent snapshot
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    /// Iterate from the most recent snapshot to the oldest
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn to_records(&self) -> Vec<SnapshotRecord> {
        self.entries.iter().copied().map(SnapshotRecord::from).collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

/// The whole ledger: balance, last accrual instant and undo history
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerState {
    pub balance: f64,
    /// Epoch milliseconds of the last accrual (or transaction)
    pub last_accrual_timestamp: i64,
    pub history: History,
}

impl LedgerState {
    pub fn new(balance: f64, last_accrual_timestamp: i64, history: History) -> Self {
        Self {
            balance,
            last_accrual_timestamp,
            history,
        }
    }

    /// Capture the current balance and timestamp
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.balance, self.last_accrual_timestamp)
    }

    /// Overwrite balance and timestamp with the captured values
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.balance = snapshot.balance;
        self.last_accrual_timestamp = snapshot.timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshots(count: usize) -> Vec<Snapshot> {
        (0..count).map(|i| Snapshot::new(i as f64 * 100.0, i as i64)).collect()
    }

    #[test]
    fn test_push_keeps_newest_at_head() {
        let mut history = History::new(3);
        history.push(Snapshot::new(1.0, 1));
        history.push(Snapshot::new(2.0, 2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.peek(), Some(&Snapshot::new(2.0, 2)));
    }

    #[test]
    fn test_eleventh_push_evicts_oldest() {
        let mut history = History::new(DEFAULT_MAX_HISTORY);
        for snapshot in snapshots(10) {
            assert!(history.push(snapshot).is_none());
        }
        assert_eq!(history.len(), 10);

        let evicted = history.push(Snapshot::new(999.0, 999));

        assert_eq!(evicted, Some(Snapshot::new(0.0, 0)));
        assert_eq!(history.len(), 10);
        assert_eq!(history.peek(), Some(&Snapshot::new(999.0, 999)));
        assert!(history.iter().all(|s| s.timestamp() != 0));
    }

    #[test]
    fn test_length_never_exceeds_bound() {
        let mut history = History::new(4);
        for snapshot in snapshots(50) {
            history.push(snapshot);
            assert!(history.len() <= 4);
        }
        // Most recent first: 49, 48, 47, 46
        let timestamps: Vec<i64> = history.iter().map(|s| s.timestamp()).collect();
        assert_eq!(timestamps, vec![49, 48, 47, 46]);
    }

    #[test]
    fn test_pop_returns_most_recent() {
        let mut history = History::new(5);
        history.push(Snapshot::new(1.0, 1));
        history.push(Snapshot::new(2.0, 2));

        assert_eq!(history.pop(), Some(Snapshot::new(2.0, 2)));
        assert_eq!(history.pop(), Some(Snapshot::new(1.0, 1)));
        assert_eq!(history.pop(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_zero_bound_is_raised_to_one() {
        let mut history = History::new(0);
        assert_eq!(history.bound(), 1);

        history.push(Snapshot::new(1.0, 1));
        let evicted = history.push(Snapshot::new(2.0, 2));

        assert_eq!(evicted, Some(Snapshot::new(1.0, 1)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_from_entries_truncates_oldest() {
        let history = History::from_entries(snapshots(6), 4);

        assert_eq!(history.len(), 4);
        let timestamps: Vec<i64> = history.iter().map(|s| s.timestamp()).collect();
        assert_eq!(timestamps, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_records_keep_order_and_values() {
        let mut history = History::new(3);
        history.push(Snapshot::new(100000.0, 10));
        history.push(Snapshot::new(95082.19178082192, 20));

        let records = history.to_records();
        assert_eq!(records[0], SnapshotRecord { debt: 95082.19178082192, date: 20 });
        assert_eq!(records[1], SnapshotRecord { debt: 100000.0, date: 10 });
    }

    #[test]
    fn test_snapshot_and_restore_are_exact() {
        let mut state = LedgerState::new(95082.19178082192, 1_700_000_000_123, History::default());
        let snapshot = state.snapshot();

        state.balance = 0.0;
        state.last_accrual_timestamp = 0;
        state.restore(snapshot);

        assert_eq!(state.balance.to_bits(), 95082.19178082192f64.to_bits());
        assert_eq!(state.last_accrual_timestamp, 1_700_000_000_123);
    }
}
