//! Tour representation for the TSP.

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::local_search::utils::{is_permutation, tour_length};
use crate::objective::{DistanceFunction, TourLength};

/// A closed tour together with its running length.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    /// Visiting order; the last city connects back to the first.
    pub cities: Vec<usize>,
    /// Total length, kept in step with `cities` by the local search.
    pub length: TourLength,
}

impl Tour {
    /// Create a tour from a visiting order and evaluate its length.
    pub fn new<D: DistanceFunction + ?Sized>(cities: Vec<usize>, objective: &D) -> Self {
        let length = tour_length(&cities, objective);
        Tour { cities, length }
    }

    /// Visit the cities in index order.
    pub fn identity<D: DistanceFunction + ?Sized>(objective: &D) -> Self {
        Tour::new((0..objective.n()).collect(), objective)
    }

    /// Uniformly random visiting order drawn from the objective's random source.
    pub fn random<D: DistanceFunction + ?Sized>(objective: &mut D) -> Self {
        let mut cities: Vec<usize> = (0..objective.n()).collect();
        let rng: &mut dyn RngCore = objective.random();
        cities.shuffle(rng);
        Tour::new(cities, &*objective)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Recompute the length from scratch.
    pub fn evaluate<D: DistanceFunction + ?Sized>(&mut self, objective: &D) {
        self.length = tour_length(&self.cities, objective);
    }

    /// Check that the tour is a permutation of `0..n`.
    pub fn is_valid(&self, n: usize) -> bool {
        is_permutation(&self.cities, n)
    }

    /// Rotate the visiting order so that `city` comes first. The cycle is
    /// unchanged.
    pub fn normalize(&mut self, city: usize) {
        if let Some(pos) = self.cities.iter().position(|&c| c == city) {
            self.cities.rotate_left(pos);
        }
    }
}

impl fmt::Debug for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tour:")?;
        writeln!(f, "  Length: {}", self.length)?;
        writeln!(f, "  Cities: {}", self.cities.len())?;
        write!(f, "  Order: {}", self.cities.iter().join(" -> "))
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.cities.iter().join(" "), self.length)
    }
}
