//! Move records for the joint 2-opt / 3-opt / 4-opt neighbourhood.
//!
//! Every move acts on an inclusive window `[i, j]` of tour positions with
//! `i < j`. Before it is applied a record caches the distances of the edges
//! it will create; once applied the same storage holds the positions whose
//! neighbourhood changed, which is all other pending records need to decide
//! whether they survive.

use serde::{Deserialize, Serialize};

use super::utils::{pred, succ};
use crate::objective::Distance;

/// The four move families searched through the shared queue.
///
/// The declaration order is the priority used by [`MoveOrder::TypeFirst`].
///
/// [`MoveOrder::TypeFirst`]: super::queue::MoveOrder::TypeFirst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MoveType {
    /// Reverse `tour[i..=j]` (2-opt).
    Reverse,
    /// The city at `i` moves to `j`, `i+1..=j` shift left by one (3-opt).
    RotateLeft,
    /// The city at `j` moves to `i`, `i..j` shift right by one (3-opt).
    RotateRight,
    /// Exchange the cities at `i` and `j` (4-opt).
    Swap,
}

impl MoveType {
    pub const ALL: [MoveType; 4] = [
        MoveType::Reverse,
        MoveType::RotateLeft,
        MoveType::RotateRight,
        MoveType::Swap,
    ];

    /// Number of edges removed (and added) by a move of this type.
    pub fn arity(self) -> usize {
        match self {
            MoveType::Reverse => 2,
            MoveType::RotateLeft | MoveType::RotateRight => 3,
            MoveType::Swap => 4,
        }
    }

    /// Whether a move of this type over `[i, j]` is a genuine, non-degenerate
    /// exchange on a tour of `n` cities.
    ///
    /// Narrow windows collapse into moves of another type, and windows that
    /// leave too little of the tour outside wrap around onto themselves. The
    /// full-tour pair `(0, n - 1)` is rejected for every type.
    pub fn admits(self, i: usize, j: usize, n: usize) -> bool {
        if i >= j || j >= n {
            return false;
        }
        let width = j - i;
        match self {
            MoveType::Reverse => width + 2 <= n,
            MoveType::RotateLeft | MoveType::RotateRight => width >= 2 && width + 2 <= n,
            MoveType::Swap => width >= 3 && width + 3 <= n,
        }
    }

    /// Type with the opposite orientation, used when a window is mirrored.
    fn mirrored(self) -> MoveType {
        match self {
            MoveType::RotateLeft => MoveType::RotateRight,
            MoveType::RotateRight => MoveType::RotateLeft,
            other => other,
        }
    }

    /// Distance-cache slots whose edges a move of this type removes.
    fn removed_slots(self, i: usize, j: usize, n: usize) -> ([usize; 4], usize) {
        let before = pred(i, n);
        match self {
            MoveType::Reverse => ([before, j, 0, 0], 2),
            MoveType::RotateLeft => ([before, i, j, 0], 3),
            MoveType::RotateRight => ([before, j - 1, j, 0], 3),
            MoveType::Swap => ([before, i, j - 1, j], 4),
        }
    }

    /// Distance-cache slots that receive the new edges once the window has
    /// been rearranged, in the order of the cached distances.
    fn written_slots(self, i: usize, j: usize, n: usize) -> ([usize; 4], usize) {
        let before = pred(i, n);
        match self {
            MoveType::Reverse => ([before, j, 0, 0], 2),
            MoveType::RotateLeft => ([before, j - 1, j, 0], 3),
            MoveType::RotateRight => ([before, i, j, 0], 3),
            MoveType::Swap => ([before, i, j - 1, j], 4),
        }
    }
}

/// Phase of a move record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    /// Queued: distances of the edges the move will create, in the order of
    /// the cache slots they are written to.
    Pending { cached: [Distance; 4] },
    /// Applied: positions whose adjacent edges changed.
    Applied { forbidden: [usize; 4], count: usize },
}

/// Outcome of checking a pending record against an applied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    KeepTransformed,
    Delete,
}

/// Index of a record inside the move pool.
pub type MoveId = usize;

/// A candidate improving move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub kind: MoveType,
    pub i: usize,
    pub j: usize,
    /// Change in tour length; always negative while queued.
    pub delta: Distance,
    pub state: MoveState,
    pub(crate) next: Option<MoveId>,
}

impl Move {
    /// Create a pending move from its new-edge distances and the current
    /// distance cache. Returns `None` unless the move strictly improves the
    /// tour.
    pub fn evaluate(
        kind: MoveType,
        i: usize,
        j: usize,
        cached: [Distance; 4],
        dist: &[Distance],
    ) -> Option<Move> {
        let n = dist.len();
        debug_assert!(kind.admits(i, j, n));
        let (slots, count) = kind.removed_slots(i, j, n);
        let mut delta: Distance = 0;
        for k in 0..count {
            delta += cached[k] - dist[slots[k]];
        }
        if delta >= 0 {
            return None;
        }
        Some(Move::pending(kind, i, j, delta, cached))
    }

    /// Pending move with a known delta and new-edge distances.
    pub fn pending(kind: MoveType, i: usize, j: usize, delta: Distance, cached: [Distance; 4]) -> Move {
        Move {
            kind,
            i,
            j,
            delta,
            state: MoveState::Pending { cached },
            next: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MoveState::Pending { .. })
    }

    /// Forbidden coordinates of an applied move.
    pub fn forbidden(&self) -> Option<&[usize]> {
        match &self.state {
            MoveState::Applied { forbidden, count } => Some(&forbidden[..*count]),
            MoveState::Pending { .. } => None,
        }
    }

    /// Apply the move to `tour` and patch `dist` from the cached distances.
    ///
    /// Runs in O(j - i) without consulting the distance function. Afterwards
    /// the record is in the [`MoveState::Applied`] phase.
    pub fn apply(&mut self, tour: &mut [usize], dist: &mut [Distance]) {
        let MoveState::Pending { cached } = self.state else {
            debug_assert!(false, "move applied twice");
            return;
        };
        let n = tour.len();
        let (i, j) = (self.i, self.j);
        debug_assert!(self.kind.admits(i, j, n));

        match self.kind {
            MoveType::Reverse => {
                tour[i..=j].reverse();
                dist[i..j].reverse();
            }
            MoveType::RotateLeft => {
                tour[i..=j].rotate_left(1);
                dist[i..j].rotate_left(1);
            }
            MoveType::RotateRight => {
                tour[i..=j].rotate_right(1);
                dist[i..j].rotate_right(1);
            }
            MoveType::Swap => tour.swap(i, j),
        }
        let (slots, count) = self.kind.written_slots(i, j, n);
        for k in 0..count {
            dist[slots[k]] = cached[k];
        }

        let mut forbidden = [pred(i, n), succ(j, n), 0, 0];
        let mut len = 2;
        if matches!(self.kind, MoveType::RotateLeft | MoveType::Swap) {
            forbidden[len] = i + 1;
            len += 1;
        }
        if matches!(self.kind, MoveType::RotateRight | MoveType::Swap) {
            forbidden[len] = j - 1;
            len += 1;
        }
        self.state = MoveState::Applied {
            forbidden,
            count: len,
        };
    }

    /// Positions whose city or adjacent edge this move's delta depends on.
    fn load_bearing(&self, n: usize) -> ([usize; 6], usize) {
        let (i, j) = (self.i, self.j);
        let mut coords = [pred(i, n), i, j, succ(j, n), 0, 0];
        let mut len = 4;
        if matches!(self.kind, MoveType::RotateLeft | MoveType::Swap) {
            coords[len] = i + 1;
            len += 1;
        }
        if matches!(self.kind, MoveType::RotateRight | MoveType::Swap) {
            coords[len] = j - 1;
            len += 1;
        }
        (coords, len)
    }

    /// Decide whether this pending move is still valid after `applied` was
    /// applied to a tour of `n` cities, rewriting its window and cached
    /// distances where the applied move only relocated the cities it uses.
    pub fn check_and_adapt(&mut self, applied: &Move, n: usize) -> Verdict {
        let Some(forbidden) = applied.forbidden() else {
            debug_assert!(false, "checked against a move that was never applied");
            return Verdict::Delete;
        };
        if !self.is_pending() {
            return Verdict::Delete;
        }

        let (coords, len) = self.load_bearing(n);
        if coords[..len].iter().any(|c| forbidden.contains(c)) {
            return Verdict::Delete;
        }

        let (a, b) = (applied.i, applied.j);
        match applied.kind {
            MoveType::Reverse => {
                let inside = |c: usize| a <= c && c <= b;
                let reflect = |c: usize| a + b - c;
                match (inside(self.i), inside(self.j)) {
                    (false, false) => Verdict::Keep,
                    (true, true) => {
                        let (i, j) = (reflect(self.j), reflect(self.i));
                        let arity = self.kind.arity();
                        self.i = i;
                        self.j = j;
                        self.cached_mut()[..arity].reverse();
                        self.kind = self.kind.mirrored();
                        Verdict::KeepTransformed
                    }
                    (true, false) if self.kind == MoveType::Swap => {
                        self.i = reflect(self.i);
                        self.cached_mut().swap(0, 1);
                        Verdict::KeepTransformed
                    }
                    (false, true) if self.kind == MoveType::Swap => {
                        self.j = reflect(self.j);
                        self.cached_mut().swap(2, 3);
                        Verdict::KeepTransformed
                    }
                    // A segment cut by the reversal no longer reconnects the
                    // same way.
                    _ => Verdict::Delete,
                }
            }
            MoveType::RotateLeft => {
                let shift = |c: usize| if a < c && c <= b { c - 1 } else { c };
                self.shift_window(shift)
            }
            MoveType::RotateRight => {
                let shift = |c: usize| if a <= c && c < b { c + 1 } else { c };
                self.shift_window(shift)
            }
            MoveType::Swap => Verdict::Keep,
        }
    }

    fn cached_mut(&mut self) -> &mut [Distance] {
        match &mut self.state {
            MoveState::Pending { cached } => &mut cached[..],
            MoveState::Applied { .. } => &mut [],
        }
    }

    fn shift_window(&mut self, shift: impl Fn(usize) -> usize) -> Verdict {
        let (i, j) = (shift(self.i), shift(self.j));
        if (i, j) == (self.i, self.j) {
            return Verdict::Keep;
        }
        self.i = i;
        self.j = j;
        Verdict::KeepTransformed
    }
}
