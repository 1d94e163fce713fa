//! ChangeLog: the ordered queue of pending topology edits.
//!
//! Insertion order is causal order. Records are never reordered or merged,
//! because removals shift the indices of every later element and consumers
//! must see them exactly as they happened.
//!
//! A log is shared between the engine that drains it and the data container
//! (or topology) that feeds it, hence [`SharedChangeLog`]. Only the owning
//! engine drains its log.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::topology::record::TopologyRecord;

/// Shared, single-threaded handle to a [`ChangeLog`].
pub type SharedChangeLog = Rc<RefCell<ChangeLog>>;

/// Ordered, appendable sequence of [`TopologyRecord`]s.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChangeLog {
    records: VecDeque<TopologyRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log behind a [`SharedChangeLog`] handle.
    pub fn shared() -> SharedChangeLog {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Append `record` at the tail.
    ///
    /// # Complexity
    /// Amortized **O(1)**.
    #[inline]
    pub fn append(&mut self, record: TopologyRecord) {
        self.records.push_back(record);
    }

    /// Take every queued record in append order, leaving the log empty.
    pub fn drain(&mut self) -> Vec<TopologyRecord> {
        self.records.drain(..).collect()
    }

    /// Put a batch that could not be applied back in front of any records
    /// appended since it was drained, preserving its internal order.
    pub fn requeue_front(&mut self, batch: Vec<TopologyRecord>) {
        for rec in batch.into_iter().rev() {
            self.records.push_front(rec);
        }
    }

    /// Number of queued records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Queued records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TopologyRecord> {
        self.records.iter()
    }

    /// Drop every queued record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Extend<TopologyRecord> for ChangeLog {
    fn extend<I: IntoIterator<Item = TopologyRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::element::ElementFamily;
    use proptest::prelude::*;

    fn rec(i: usize) -> TopologyRecord {
        TopologyRecord::points_removed(vec![i])
    }

    #[test]
    fn drain_empties_log() {
        let mut log = ChangeLog::new();
        log.append(rec(1));
        log.append(rec(2));
        assert_eq!(log.len(), 2);
        let batch = log.drain();
        assert_eq!(batch, vec![rec(1), rec(2)]);
        assert!(log.is_empty());
        assert!(log.drain().is_empty());
    }

    #[test]
    fn requeue_goes_before_newer_records() {
        let mut log = ChangeLog::new();
        log.append(rec(1));
        log.append(rec(2));
        let batch = log.drain();
        log.append(rec(3));
        log.requeue_front(batch);
        let order: Vec<_> = log.iter().map(|r| r.indices()[0]).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn shared_handle_sees_appends() {
        let log = ChangeLog::shared();
        let other = Rc::clone(&log);
        other
            .borrow_mut()
            .append(TopologyRecord::added(ElementFamily::Edges, 0..2));
        assert_eq!(log.borrow().len(), 1);
    }

    proptest! {
        #[test]
        fn drain_preserves_append_order(idx in proptest::collection::vec(0usize..1000, 0..64)) {
            let mut log = ChangeLog::new();
            for &i in &idx {
                log.append(rec(i));
            }
            let drained: Vec<usize> = log.drain().iter().map(|r| r.indices()[0]).collect();
            prop_assert_eq!(drained, idx);
            prop_assert!(log.is_empty());
        }
    }
}
