//! # TSP move queue
//!
//! Local search for the Traveling Salesman Problem that searches 2-opt
//! reversals, two 3-opt rotations and a 4-opt swap jointly through one
//! shared candidate queue.
//!
//! Instead of re-evaluating every neighbourhood after each improvement, the
//! engine keeps all pending improving moves in a pooled queue, applies the
//! best one, and in a single pass drops the candidates the move invalidated
//! while rewriting the window of those it merely shifted or mirrored. Only
//! the region touched by applied moves is rescanned once the queue is empty.
//!
//! The ordering policy decides between steepest descent
//! ([`MoveOrder::BestFirst`]) and a type-prioritised variable neighbourhood
//! descent ([`MoveOrder::TypeFirst`]).

pub mod config;
pub mod local_search;
pub mod objective;
pub mod problem;
pub mod tour;
pub mod utils;

pub use crate::local_search::{LocalSearch, LocalSearchConfig, MoveOrder, SearchStats};
pub use crate::objective::{Distance, DistanceFunction, Objective, TourLength};

use crate::config::Config;
use crate::problem::Problem;
use crate::tour::Tour;

use log::info;
use std::time::{Duration, Instant};

/// Multi-start driver: improves random tours with the local search and keeps
/// the best result.
pub struct Solver {
    pub problem: Problem,
    pub config: Config,
    pub best_tour: Option<Tour>,
    pub run_time: Duration,
    /// Statistics of every local search run, in order.
    pub runs: Vec<SearchStats>,
    /// Distance queries answered during the last `run`.
    pub evaluations: u64,
}

impl Solver {
    /// Create a new solver for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        Solver {
            problem,
            config,
            best_tour: None,
            run_time: Duration::from_secs(0),
            runs: Vec::new(),
            evaluations: 0,
        }
    }

    /// Run all restarts, or until the time or move budget is spent.
    pub fn run(&mut self) -> Option<&Tour> {
        let start_time = Instant::now();
        self.runs.clear();
        self.best_tour = None;

        let mut objective = Objective::new(&self.problem, self.config.seed);
        if let Some(limit) = self.config.time_limit {
            objective = objective.with_time_limit(limit);
        }
        if let Some(limit) = self.config.max_candidates {
            objective = objective.with_max_candidates(limit);
        }
        let mut local_search = LocalSearch::new(self.config.local_search());

        for restart in 0..self.config.restarts.max(1) {
            if restart > 0 && objective.should_terminate() {
                break;
            }

            let mut tour = Tour::random(&mut objective);
            objective.offer(&tour.cities, tour.length);
            let initial_length = tour.length;
            let stats = local_search.improve(&mut tour, &mut objective);
            info!(
                "restart {}: {} -> {} ({} moves)",
                restart + 1,
                initial_length,
                tour.length,
                stats.moves_applied
            );
            self.runs.push(stats);

            let improves = match &self.best_tour {
                Some(best) => tour.length < best.length,
                None => true,
            };
            if improves {
                self.best_tour = Some(tour);
            }
        }

        self.evaluations = objective.evaluations();
        self.run_time = start_time.elapsed();
        self.best_tour.as_ref()
    }
}
