//! Utility functions for local search operations.

use itertools::Itertools;

use crate::objective::{Distance, DistanceFunction, TourLength};

/// Position before `k` on a circular tour of `n` cities.
#[inline]
pub fn pred(k: usize, n: usize) -> usize {
    if k == 0 {
        n - 1
    } else {
        k - 1
    }
}

/// Position after `k` on a circular tour of `n` cities.
#[inline]
pub fn succ(k: usize, n: usize) -> usize {
    if k + 1 == n {
        0
    } else {
        k + 1
    }
}

/// Build the distance cache of a tour: slot `k` holds the length of the edge
/// leaving position `k`.
pub fn distance_cache<D: DistanceFunction + ?Sized>(tour: &[usize], objective: &D) -> Vec<Distance> {
    if tour.len() < 2 {
        return vec![0; tour.len()];
    }
    tour.iter()
        .circular_tuple_windows()
        .map(|(&a, &b)| objective.distance(a, b))
        .collect()
}

/// Total length of a closed tour.
pub fn tour_length<D: DistanceFunction + ?Sized>(tour: &[usize], objective: &D) -> TourLength {
    distance_cache(tour, objective)
        .into_iter()
        .map(TourLength::from)
        .sum()
}

/// Check that `tour` visits every city of `0..n` exactly once.
pub fn is_permutation(tour: &[usize], n: usize) -> bool {
    if tour.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &city in tour {
        if city >= n || seen[city] {
            return false;
        }
        seen[city] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_neighbours() {
        assert_eq!(pred(0, 5), 4);
        assert_eq!(pred(3, 5), 2);
        assert_eq!(succ(4, 5), 0);
        assert_eq!(succ(1, 5), 2);
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[2, 2, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
        assert!(!is_permutation(&[0, 1], 3));
    }
}
