//! Mutable state of one local search run.

use super::moves::Move;
use super::queue::{MoveQueue, RescanSummary};
use super::utils::distance_cache;
use super::LocalSearchConfig;
use crate::objective::{Distance, DistanceFunction, TourLength};

/// Tour, distance cache and move pool of a single search.
///
/// The state borrows the caller's tour exclusively for its whole lifetime;
/// nothing in here is shared between searches.
pub struct SearchState<'t> {
    pub(super) tour: &'t mut [usize],
    pub(super) dist: Vec<Distance>,
    pub(super) queue: MoveQueue,
}

impl<'t> SearchState<'t> {
    /// Seed the distance cache of `tour` and set up an empty move pool.
    pub fn new<D: DistanceFunction + ?Sized>(
        tour: &'t mut [usize],
        objective: &D,
        config: &LocalSearchConfig,
    ) -> Self {
        let dist = distance_cache(tour, objective);
        SearchState {
            tour,
            dist,
            queue: MoveQueue::new(config.move_order, config.max_move_allocations),
        }
    }

    pub fn n(&self) -> usize {
        self.tour.len()
    }

    pub fn tour(&self) -> &[usize] {
        &self.tour[..]
    }

    pub fn distances(&self) -> &[Distance] {
        &self.dist
    }

    pub fn queue(&self) -> &MoveQueue {
        &self.queue
    }

    /// Tour length according to the distance cache.
    pub fn cached_length(&self) -> TourLength {
        self.dist.iter().map(|&d| TourLength::from(d)).sum()
    }

    /// Apply the best queued move to the tour and distance cache.
    ///
    /// The record stays at the head of the queue, now holding its forbidden
    /// coordinates, until [`SearchState::rescan`] retires it. Returns a copy
    /// of the applied record.
    pub fn apply_head(&mut self) -> Option<Move> {
        let id = self.queue.head()?;
        let record = self.queue.get_mut(id);
        record.apply(self.tour, &mut self.dist);
        Some(*record)
    }

    /// Retire the applied head and bring the rest of the queue in line with
    /// the new tour.
    pub fn rescan(&mut self) -> RescanSummary {
        let n = self.n();
        self.queue.pop_and_rescan(n)
    }

    /// Return every pooled record.
    pub fn dispose_all(&mut self) {
        self.queue.dispose_all();
    }
}
