//! Candidate generation ("fill") for the move queue.

use itertools::Itertools;
use log::debug;

use super::moves::{Move, MoveType};
use super::state::SearchState;
use super::utils::{pred, succ};
use crate::objective::{Distance, DistanceFunction};

/// Positions scanned on either side of a dirty range.
///
/// Applied moves report forbidden coordinates one position outside their
/// window, and a pair's delta reaches one position past each endpoint.
pub const SCAN_MARGIN: usize = 2;

/// Hull `[lo, hi]` of the windows of all moves applied since the last fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRange {
    pub lo: usize,
    pub hi: usize,
}

impl DirtyRange {
    pub fn new(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi);
        DirtyRange { lo, hi }
    }

    /// Grow `range` to cover the window `[i, j]`.
    pub fn extend(range: &mut Option<DirtyRange>, i: usize, j: usize) {
        *range = Some(match *range {
            Some(r) => DirtyRange::new(r.lo.min(i), r.hi.max(j)),
            None => DirtyRange::new(i, j),
        });
    }

    /// Sorted positions a refill has to look at on a tour of `n` cities, or
    /// `None` when the band with its margin covers the whole tour.
    pub fn scan_positions(&self, n: usize) -> Option<Vec<usize>> {
        let span = self.hi - self.lo + 1 + 2 * SCAN_MARGIN;
        if span >= n {
            return None;
        }
        let start = self.lo + n - SCAN_MARGIN;
        Some((0..span).map(|k| (start + k) % n).sorted().collect())
    }
}

/// Which index pairs a fill pass examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRange {
    Full,
    Dirty(DirtyRange),
}

/// Result of one fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Index pairs examined.
    pub pairs: usize,
    /// Improving moves added to the queue.
    pub enqueued: usize,
    /// The pool ran out before the scan finished.
    pub incomplete: bool,
}

impl SearchState<'_> {
    /// Scan index pairs in `range`, enqueueing every improving move.
    ///
    /// Stops as soon as the move pool is exhausted and reports the pass as
    /// incomplete; the pairs it did not reach are picked up by the next full
    /// pass.
    pub fn fill<D: DistanceFunction + ?Sized>(
        &mut self,
        objective: &D,
        range: FillRange,
    ) -> FillOutcome {
        let n = self.n();
        let mut outcome = FillOutcome::default();
        if n < 4 {
            return outcome;
        }

        let marked = match range {
            FillRange::Full => None,
            FillRange::Dirty(dirty) => dirty.scan_positions(n),
        };

        match &marked {
            None => {
                'full: for i in 0..n {
                    for j in i + 1..n {
                        if !self.scan_pair(objective, i, j, &mut outcome) {
                            break 'full;
                        }
                    }
                }
            }
            Some(marked) => {
                let mut is_marked = vec![false; n];
                for &p in marked {
                    is_marked[p] = true;
                }
                'dirty: for i in 0..n {
                    if is_marked[i] {
                        for j in i + 1..n {
                            if !self.scan_pair(objective, i, j, &mut outcome) {
                                break 'dirty;
                            }
                        }
                    } else {
                        let start = marked.partition_point(|&p| p <= i);
                        for &j in &marked[start..] {
                            if !self.scan_pair(objective, i, j, &mut outcome) {
                                break 'dirty;
                            }
                        }
                    }
                }
            }
        }

        debug!(
            "fill {}: {} pairs, {} moves enqueued{}",
            if marked.is_some() { "dirty" } else { "full" },
            outcome.pairs,
            outcome.enqueued,
            if outcome.incomplete { " (pool exhausted)" } else { "" }
        );
        outcome
    }

    /// Evaluate every admissible move type on `(i, j)`. Returns `false` when
    /// an improving move could not be allocated.
    fn scan_pair<D: DistanceFunction + ?Sized>(
        &mut self,
        objective: &D,
        i: usize,
        j: usize,
        outcome: &mut FillOutcome,
    ) -> bool {
        let n = self.n();
        if i == 0 && j == n - 1 {
            return true;
        }
        outcome.pairs += 1;

        let t = &*self.tour;
        let before = t[pred(i, n)];
        let first = t[i];
        let second = t[i + 1];
        let penultimate = t[j - 1];
        let last = t[j];
        let after = t[succ(j, n)];

        let before_last = objective.distance(before, last);
        let first_after = objective.distance(first, after);
        let last_first = objective.distance(last, first);

        for kind in MoveType::ALL {
            if !kind.admits(i, j, n) {
                continue;
            }
            let cached: [Distance; 4] = match kind {
                MoveType::Reverse => [before_last, first_after, 0, 0],
                MoveType::RotateLeft => [
                    objective.distance(before, second),
                    last_first,
                    first_after,
                    0,
                ],
                MoveType::RotateRight => [
                    before_last,
                    last_first,
                    objective.distance(penultimate, after),
                    0,
                ],
                MoveType::Swap => [
                    before_last,
                    objective.distance(last, second),
                    objective.distance(penultimate, first),
                    first_after,
                ],
            };
            let Some(candidate) = Move::evaluate(kind, i, j, cached, &self.dist) else {
                continue;
            };
            match self.queue.allocate(candidate) {
                Some(id) => {
                    self.queue.enqueue(id);
                    outcome.enqueued += 1;
                }
                None => {
                    outcome.incomplete = true;
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_range_extends_to_hull() {
        let mut range = None;
        DirtyRange::extend(&mut range, 5, 8);
        DirtyRange::extend(&mut range, 2, 4);
        DirtyRange::extend(&mut range, 6, 7);
        assert_eq!(range, Some(DirtyRange::new(2, 8)));
    }

    #[test]
    fn test_scan_positions_wrap_around() {
        let range = DirtyRange::new(0, 1);
        assert_eq!(range.scan_positions(20), Some(vec![0, 1, 2, 3, 18, 19]));

        let range = DirtyRange::new(17, 19);
        assert_eq!(range.scan_positions(20), Some(vec![0, 1, 15, 16, 17, 18, 19]));
    }

    #[test]
    fn test_scan_positions_cover_small_tours() {
        assert_eq!(DirtyRange::new(1, 3).scan_positions(7), None);
        assert!(DirtyRange::new(1, 3).scan_positions(8).is_some());
    }
}
