//! Move-queue local search.
//!
//! All four move families (2-opt reversal, the two 3-opt rotations and the
//! 4-opt swap) share one candidate queue. The driver seeds a distance cache,
//! fills the queue with every improving move, and then repeatedly applies
//! the best candidate and brings the remaining candidates in line with the
//! changed tour in a single pass. When the queue runs dry only the part of
//! the tour touched since the last scan is scanned again; the search stops
//! when that scan finds nothing.

pub mod fill;
pub mod moves;
pub mod queue;
pub mod state;
pub mod utils;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::objective::{DistanceFunction, TourLength};
use crate::tour::Tour;

pub use self::fill::{DirtyRange, FillOutcome, FillRange};
pub use self::moves::{Move, MoveState, MoveType, Verdict};
pub use self::queue::{MoveOrder, MoveQueue, DEFAULT_MAX_MOVE_ALLOCATIONS};
pub use self::state::SearchState;

/// Settings read by the local search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    pub move_order: MoveOrder,
    /// Cap on live move records. Only limits how much of the tour one fill
    /// pass can hold at once.
    pub max_move_allocations: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        LocalSearchConfig {
            move_order: MoveOrder::BestFirst,
            max_move_allocations: DEFAULT_MAX_MOVE_ALLOCATIONS,
        }
    }
}

/// Counters collected during one local search run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub fills: usize,
    pub full_fills: usize,
    pub incomplete_fills: usize,
    pub moves_enqueued: usize,
    pub moves_applied: usize,
    pub moves_deleted: usize,
    pub moves_transformed: usize,
    pub peak_live_moves: usize,
    /// The run stopped on the termination signal before converging.
    pub cancelled: bool,
}

impl SearchStats {
    fn record_fill(&mut self, range: FillRange, outcome: &FillOutcome) {
        self.fills += 1;
        if range == FillRange::Full {
            self.full_fills += 1;
        }
        if outcome.incomplete {
            self.incomplete_fills += 1;
        }
        self.moves_enqueued += outcome.enqueued;
    }
}

/// Drives the fill / drain / refill cycle.
pub struct LocalSearch {
    pub config: LocalSearchConfig,
}

impl LocalSearch {
    /// Create a new local search instance.
    pub fn new(config: LocalSearchConfig) -> Self {
        LocalSearch { config }
    }

    /// Improve `tour` in place and keep its length in step.
    pub fn improve<D: DistanceFunction + ?Sized>(
        &mut self,
        tour: &mut Tour,
        objective: &mut D,
    ) -> SearchStats {
        self.run(&mut tour.cities, &mut tour.length, objective)
    }

    /// Run the search on `tour` until no improving move is left or the
    /// objective asks to stop.
    ///
    /// `length` must hold the true length of `tour` on entry; it is
    /// incremented by the delta of every applied move. Each applied move is
    /// reported through [`DistanceFunction::register_candidate`] before the
    /// termination signal is polled, so an early return always leaves a
    /// fully updated tour behind.
    pub fn run<D: DistanceFunction + ?Sized>(
        &mut self,
        tour: &mut [usize],
        length: &mut TourLength,
        objective: &mut D,
    ) -> SearchStats {
        let mut stats = SearchStats::default();
        let n = tour.len();
        debug_assert!(utils::is_permutation(tour, objective.n()));
        if n < 4 {
            return stats;
        }
        if objective.should_terminate() {
            stats.cancelled = true;
            return stats;
        }

        let mut state = SearchState::new(tour, &*objective, &self.config);
        debug_assert_eq!(state.cached_length(), *length, "stale tour length");

        let mut range = FillRange::Full;
        loop {
            let outcome = state.fill(&*objective, range);
            stats.record_fill(range, &outcome);
            if outcome.enqueued == 0 {
                break;
            }

            let mut dirty: Option<DirtyRange> = None;
            while let Some(applied) = state.apply_head() {
                *length += TourLength::from(applied.delta);
                stats.moves_applied += 1;
                trace!(
                    "applied {:?} [{}, {}] delta {} -> {}",
                    applied.kind,
                    applied.i,
                    applied.j,
                    applied.delta,
                    length
                );
                DirtyRange::extend(&mut dirty, applied.i, applied.j);
                objective.register_candidate(state.tour(), *length);

                if objective.should_terminate() {
                    stats.peak_live_moves = state.queue().peak_live();
                    state.dispose_all();
                    stats.cancelled = true;
                    info!(
                        "local search cancelled after {} moves, length {}",
                        stats.moves_applied, length
                    );
                    return stats;
                }

                let summary = state.rescan();
                stats.moves_deleted += summary.deleted;
                stats.moves_transformed += summary.transformed;
            }

            range = match dirty {
                Some(dirty) if !outcome.incomplete => FillRange::Dirty(dirty),
                _ => FillRange::Full,
            };
            debug!("queue drained, next fill {:?}", range);
        }

        stats.peak_live_moves = state.queue().peak_live();
        state.dispose_all();
        info!(
            "local search converged: {} moves applied over {} fills, length {}",
            stats.moves_applied, stats.fills, length
        );
        stats
    }
}
