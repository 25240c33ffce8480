use std::collections::VecDeque;

use crate::snapshot::Snapshot;

/// Upper bound on retained snapshots. Capturing beyond it evicts the oldest
/// entry, trading deep undo for bounded memory.
pub const MAX_HISTORY: usize = 50;

/// Ordered snapshots, oldest first. Once a baseline has been captured the
/// log never drains below one entry, so there is always a state to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    snapshots: VecDeque<Snapshot>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted entries, keeping the newest
    /// [`MAX_HISTORY`] when the record is oversized.
    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Self {
        let mut snapshots: VecDeque<Snapshot> = snapshots.into();
        while snapshots.len() > MAX_HISTORY {
            snapshots.pop_front();
        }
        Self { snapshots }
    }

    pub fn capture(&mut self, snapshot: Snapshot) {
        if self.snapshots.len() >= MAX_HISTORY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// The entry undo would repaint: the one just below the newest. `None`
    /// when the log is at its floor and undo must not run.
    pub fn undo_target(&self) -> Option<&Snapshot> {
        if self.snapshots.len() <= 1 {
            return None;
        }
        self.snapshots.get(self.snapshots.len() - 2)
    }

    /// Discard the newest entry. Refuses at the floor so the log can never
    /// become empty once seeded.
    pub fn drop_newest(&mut self) -> Option<Snapshot> {
        if self.snapshots.len() <= 1 {
            return None;
        }
        self.snapshots.pop_back()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: &str) -> Snapshot {
        Snapshot::from_encoded(tag)
    }

    #[test]
    fn capture_appends_in_order() {
        let mut log = HistoryLog::new();
        log.capture(snap("a"));
        log.capture(snap("b"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest(), Some(&snap("b")));
    }

    #[test]
    fn capture_evicts_the_oldest_at_the_cap() {
        let mut log = HistoryLog::new();
        for i in 0..MAX_HISTORY {
            log.capture(snap(&format!("s{i}")));
        }
        assert_eq!(log.len(), MAX_HISTORY);
        log.capture(snap("newest"));
        assert_eq!(log.len(), MAX_HISTORY);
        assert_eq!(log.snapshots().next(), Some(&snap("s1")));
        assert_eq!(log.latest(), Some(&snap("newest")));
    }

    #[test]
    fn undo_refuses_at_the_floor() {
        let mut log = HistoryLog::new();
        assert!(log.undo_target().is_none());
        assert!(log.drop_newest().is_none());

        log.capture(snap("baseline"));
        assert!(log.undo_target().is_none());
        assert!(log.drop_newest().is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn undo_exposes_the_previous_entry() {
        let mut log = HistoryLog::new();
        log.capture(snap("a"));
        log.capture(snap("b"));
        log.capture(snap("c"));

        assert_eq!(log.undo_target(), Some(&snap("b")));
        assert_eq!(log.drop_newest(), Some(snap("c")));
        assert_eq!(log.latest(), Some(&snap("b")));
        assert_eq!(log.undo_target(), Some(&snap("a")));
    }

    #[test]
    fn oversized_persisted_records_keep_the_newest_entries() {
        let stored: Vec<Snapshot> = (0..MAX_HISTORY + 7)
            .map(|i| snap(&format!("s{i}")))
            .collect();
        let log = HistoryLog::from_snapshots(stored);
        assert_eq!(log.len(), MAX_HISTORY);
        assert_eq!(log.snapshots().next(), Some(&snap("s7")));
        assert_eq!(log.latest(), Some(&snap(&format!("s{}", MAX_HISTORY + 6))));
    }
}
