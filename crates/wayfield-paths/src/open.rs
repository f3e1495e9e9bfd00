//! Open-list entries for the priority-queue searches.

use std::cmp::Ordering;

/// A pending cell in a search's open list, ordered for `BinaryHeap` so the
/// heap pops the lowest priority first.
///
/// Ties on `priority` go to the smaller `h` (the cell nearer the goal), then
/// to the earlier `seq`, so equal-cost cells come out in insertion order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub(crate) idx: usize,
    pub(crate) priority: f64,
    pub(crate) h: f64,
    pub(crate) seq: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .priority
            .total_cmp(&self.priority)
            .then(other.h.total_cmp(&self.h))
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}
