//! Configuration parameters for the move-queue local search.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::local_search::queue::{MoveOrder, DEFAULT_MAX_MOVE_ALLOCATIONS};
use crate::local_search::LocalSearchConfig;

/// Configuration settings for the solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Order in which queued moves are applied
    pub move_order: MoveOrder,
    /// Maximum number of live move records in the pool
    pub max_move_allocations: usize,
    /// Number of random starting tours to improve
    pub restarts: usize,
    /// Seed for the random source
    pub seed: u64,
    /// Optional time limit for the whole run
    pub time_limit: Option<Duration>,
    /// Optional cap on the number of applied moves over the whole run
    pub max_candidates: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            move_order: MoveOrder::BestFirst,
            max_move_allocations: DEFAULT_MAX_MOVE_ALLOCATIONS,
            restarts: 1,
            seed: 0,
            time_limit: None,
            max_candidates: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the move ordering policy.
    pub fn with_move_order(mut self, order: MoveOrder) -> Self {
        self.move_order = order;
        self
    }

    /// Set the cap on live move records. Zero is raised to one.
    pub fn with_max_move_allocations(mut self, cap: usize) -> Self {
        self.max_move_allocations = cap.max(1);
        self
    }

    /// Set the number of random restarts. Zero is raised to one.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Stop after this many applied moves.
    pub fn with_max_candidates(mut self, limit: u64) -> Self {
        self.max_candidates = Some(limit);
        self
    }

    /// The part of the configuration the local search engine reads.
    pub fn local_search(&self) -> LocalSearchConfig {
        LocalSearchConfig {
            move_order: self.move_order,
            max_move_allocations: self.max_move_allocations,
        }
    }
}
