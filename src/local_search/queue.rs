//! Pooled candidate queue shared by all move types.
//!
//! Records live in an arena addressed by [`MoveId`] and are recycled through
//! a free-index stack, so draining and refilling the queue never touches the
//! allocator once the pool has grown. The queue itself is a singly linked
//! chain through the records whose head is always the best candidate under
//! the active [`MoveOrder`]; the rest of the chain is unordered.

use serde::{Deserialize, Serialize};

use super::moves::{Move, MoveId, Verdict};

/// Default cap on the number of live move records.
pub const DEFAULT_MAX_MOVE_ALLOCATIONS: usize = 1 << 20;

/// Ordering policy for selecting the next move to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveOrder {
    /// Steepest descent: the most negative delta first.
    #[default]
    BestFirst,
    /// Lower-order move types first (Reverse, RotateLeft, RotateRight, Swap),
    /// best delta within a type.
    TypeFirst,
}

impl MoveOrder {
    /// Whether `a` should be applied before `b`.
    #[inline]
    pub fn prefers(self, a: &Move, b: &Move) -> bool {
        match self {
            MoveOrder::BestFirst => a.delta < b.delta,
            MoveOrder::TypeFirst => (a.kind, a.delta) < (b.kind, b.delta),
        }
    }
}

/// What a rescan did to the pending records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanSummary {
    pub deleted: usize,
    pub transformed: usize,
    pub kept: usize,
}

/// Arena-backed queue of candidate moves.
pub struct MoveQueue {
    records: Vec<Move>,
    free: Vec<MoveId>,
    head: Option<MoveId>,
    len: usize,
    max_records: usize,
    peak_live: usize,
    order: MoveOrder,
}

impl MoveQueue {
    /// Create an empty queue whose pool never holds more than `max_records`
    /// live records.
    pub fn new(order: MoveOrder, max_records: usize) -> Self {
        MoveQueue {
            records: Vec::new(),
            free: Vec::new(),
            head: None,
            len: 0,
            max_records: max_records.max(1),
            peak_live: 0,
            order,
        }
    }

    pub fn order(&self) -> MoveOrder {
        self.order
    }

    /// Number of queued records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of records currently handed out by the pool.
    pub fn live(&self) -> usize {
        self.records.len() - self.free.len()
    }

    /// Highest number of simultaneously live records seen so far.
    pub fn peak_live(&self) -> usize {
        self.peak_live
    }

    pub fn head(&self) -> Option<MoveId> {
        self.head
    }

    pub fn get(&self, id: MoveId) -> &Move {
        &self.records[id]
    }

    pub fn get_mut(&mut self, id: MoveId) -> &mut Move {
        &mut self.records[id]
    }

    /// Iterate over the queued records, head first.
    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        std::iter::successors(self.head, move |&id| self.records[id].next)
            .map(move |id| &self.records[id])
    }

    /// Take a record slot from the pool and store `record` in it.
    ///
    /// Returns `None` once the pool is at its cap and no recycled slot is
    /// available.
    pub fn allocate(&mut self, record: Move) -> Option<MoveId> {
        let id = match self.free.pop() {
            Some(id) => {
                self.records[id] = record;
                id
            }
            None if self.records.len() < self.max_records => {
                self.records.push(record);
                self.records.len() - 1
            }
            None => return None,
        };
        self.records[id].next = None;
        self.peak_live = self.peak_live.max(self.live());
        Some(id)
    }

    /// Link an allocated record into the chain in O(1).
    ///
    /// The record becomes the new head if it beats the current head,
    /// otherwise it is inserted right behind it.
    pub fn enqueue(&mut self, id: MoveId) {
        self.len += 1;
        let Some(head) = self.head else {
            self.records[id].next = None;
            self.head = Some(id);
            return;
        };
        if self.order.prefers(&self.records[id], &self.records[head]) {
            self.records[id].next = Some(head);
            self.head = Some(id);
        } else {
            self.records[id].next = self.records[head].next;
            self.records[head].next = Some(id);
        }
    }

    /// Unlink the head, which the caller has just applied, check every other
    /// record against it, free the ones it invalidated and promote the best
    /// survivor to the head. One pass over the chain.
    pub fn pop_and_rescan(&mut self, n: usize) -> RescanSummary {
        let mut summary = RescanSummary::default();
        let Some(applied_id) = self.head else {
            return summary;
        };
        let applied = self.records[applied_id];
        debug_assert!(!applied.is_pending(), "head popped before it was applied");
        self.len -= 1;
        self.release(applied_id);

        let mut first = applied.next;
        let mut prev: Option<MoveId> = None;
        let mut best: Option<MoveId> = None;
        let mut best_prev: Option<MoveId> = None;
        let mut cursor = first;

        while let Some(id) = cursor {
            let next = self.records[id].next;
            match self.records[id].check_and_adapt(&applied, n) {
                Verdict::Delete => {
                    match prev {
                        Some(p) => self.records[p].next = next,
                        None => first = next,
                    }
                    self.len -= 1;
                    self.release(id);
                    summary.deleted += 1;
                }
                verdict => {
                    if verdict == Verdict::KeepTransformed {
                        summary.transformed += 1;
                    } else {
                        summary.kept += 1;
                    }
                    let better = match best {
                        Some(b) => self.order.prefers(&self.records[id], &self.records[b]),
                        None => true,
                    };
                    if better {
                        best = Some(id);
                        best_prev = prev;
                    }
                    prev = Some(id);
                }
            }
            cursor = next;
        }

        if let (Some(b), Some(p)) = (best, best_prev) {
            self.records[p].next = self.records[b].next;
            self.records[b].next = first;
            first = Some(b);
        }
        self.head = first;
        summary
    }

    /// Return every queued record to the pool.
    pub fn dispose_all(&mut self) {
        let mut cursor = self.head.take();
        while let Some(id) = cursor {
            cursor = self.records[id].next;
            self.release(id);
        }
        self.len = 0;
    }

    fn release(&mut self, id: MoveId) {
        self.records[id].next = None;
        self.free.push(id);
    }
}
