//! Distance function interface consumed by the local search, and the
//! bookkeeping objective used by the solver.

use std::cell::Cell;
use std::time::{Duration, Instant};

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::problem::Problem;

/// Length of a single edge. Per-move deltas use the same width.
pub type Distance = i32;

/// Length of a whole tour.
pub type TourLength = i64;

/// What the local search needs from its surroundings.
///
/// `distance` must behave as a pure, symmetric query; implementations may
/// count evaluations through interior mutability.
pub trait DistanceFunction {
    /// Non-negative distance between cities `a` and `b`.
    fn distance(&self, a: usize, b: usize) -> Distance;

    /// Number of cities.
    fn n(&self) -> usize;

    fn symmetric(&self) -> bool;

    /// Random source for outer algorithms (restarts, perturbations).
    fn random(&mut self) -> &mut dyn RngCore;

    /// Called once per accepted move with the improved tour.
    fn register_candidate(&mut self, tour: &[usize], length: TourLength);

    /// Cooperative cancellation signal, polled after every applied move.
    fn should_terminate(&self) -> bool;
}

/// Distance function over a [`Problem`] that tracks evaluations, the best
/// tour seen and a termination budget.
pub struct Objective<'p> {
    problem: &'p Problem,
    evaluations: Cell<u64>,
    rng: ChaCha8Rng,
    best: Option<(Vec<usize>, TourLength)>,
    history: Vec<TourLength>,
    start_time: Instant,
    time_limit: Option<Duration>,
    max_candidates: Option<u64>,
}

impl<'p> Objective<'p> {
    pub fn new(problem: &'p Problem, seed: u64) -> Self {
        Objective {
            problem,
            evaluations: Cell::new(0),
            rng: ChaCha8Rng::seed_from_u64(seed),
            best: None,
            history: Vec::new(),
            start_time: Instant::now(),
            time_limit: None,
            max_candidates: None,
        }
    }

    /// Stop once `limit` has elapsed since construction.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Stop once `limit` candidates have been registered.
    pub fn with_max_candidates(mut self, limit: u64) -> Self {
        self.max_candidates = Some(limit);
        self
    }

    pub fn problem(&self) -> &Problem {
        self.problem
    }

    /// Number of distance queries answered so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    /// Lengths of all registered candidates, in registration order.
    pub fn history(&self) -> &[TourLength] {
        &self.history
    }

    pub fn candidates(&self) -> u64 {
        self.history.len() as u64
    }

    /// Best tour registered so far.
    pub fn best(&self) -> Option<(&[usize], TourLength)> {
        self.best
            .as_ref()
            .map(|(tour, length)| (tour.as_slice(), *length))
    }

    /// Offer a tour that did not come out of a local search move, e.g. a
    /// starting tour.
    pub fn offer(&mut self, tour: &[usize], length: TourLength) {
        let improves = match &self.best {
            Some((_, best)) => length < *best,
            None => true,
        };
        if improves {
            self.best = Some((tour.to_vec(), length));
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl DistanceFunction for Objective<'_> {
    fn distance(&self, a: usize, b: usize) -> Distance {
        self.evaluations.set(self.evaluations.get() + 1);
        self.problem.get_distance(a, b)
    }

    fn n(&self) -> usize {
        self.problem.dimension()
    }

    fn symmetric(&self) -> bool {
        self.problem.is_symmetric()
    }

    fn random(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn register_candidate(&mut self, tour: &[usize], length: TourLength) {
        self.history.push(length);
        self.offer(tour, length);
    }

    fn should_terminate(&self) -> bool {
        if let Some(limit) = self.max_candidates {
            if self.candidates() >= limit {
                return true;
            }
        }
        if let Some(limit) = self.time_limit {
            if self.start_time.elapsed() >= limit {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_problem() -> Problem {
        Problem::from_matrix(
            "line".to_string(),
            vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
        )
    }

    #[test]
    fn test_counts_evaluations() {
        let problem = line_problem();
        let objective = Objective::new(&problem, 1);
        assert_eq!(objective.distance(0, 2), 2);
        assert_eq!(objective.distance(1, 2), 1);
        assert_eq!(objective.evaluations(), 2);
    }

    #[test]
    fn test_tracks_best_candidate() {
        let problem = line_problem();
        let mut objective = Objective::new(&problem, 1);
        objective.register_candidate(&[0, 1, 2], 4);
        objective.register_candidate(&[0, 2, 1], 5);
        assert_eq!(objective.best(), Some((&[0, 1, 2][..], 4)));
        assert_eq!(objective.history(), &[4, 5]);
    }

    #[test]
    fn test_candidate_budget_terminates() {
        let problem = line_problem();
        let mut objective = Objective::new(&problem, 1).with_max_candidates(1);
        assert!(!objective.should_terminate());
        objective.register_candidate(&[0, 1, 2], 4);
        assert!(objective.should_terminate());
    }
}
