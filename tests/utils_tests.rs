//! Unit tests for utility functions and the tour type.

use tsp_move_queue::local_search::utils::*;
use tsp_move_queue::objective::Objective;
use tsp_move_queue::problem::{Node, Problem};
use tsp_move_queue::tour::Tour;
use tsp_move_queue::utils as general_utils;
use std::time::Duration;

/// Unit square scaled by 10, corners in counter-clockwise order.
fn create_square_problem() -> Problem {
    let nodes = vec![
        Node::new(0, 0.0, 0.0),
        Node::new(1, 10.0, 0.0),
        Node::new(2, 10.0, 10.0),
        Node::new(3, 0.0, 10.0),
    ];
    Problem::new("square".to_string(), nodes)
}

#[test]
fn test_distance_cache_follows_tour_order() {
    let problem = create_square_problem();
    let objective = Objective::new(&problem, 0);

    let cache = distance_cache(&[0, 2, 1, 3], &objective);
    assert_eq!(cache, vec![14, 10, 14, 10]);
    assert_eq!(tour_length(&[0, 2, 1, 3], &objective), 48);
    assert_eq!(tour_length(&[0, 1, 2, 3], &objective), 40);
}

#[test]
fn test_degenerate_tours() {
    let problem = create_square_problem();
    let objective = Objective::new(&problem, 0);

    assert!(distance_cache(&[], &objective).is_empty());
    assert_eq!(distance_cache(&[2], &objective), vec![0]);
    // Two cities: out and back.
    assert_eq!(tour_length(&[0, 1], &objective), 20);
}

#[test]
fn test_tour_normalize_keeps_cycle() {
    let problem = create_square_problem();
    let objective = Objective::new(&problem, 0);

    let mut tour = Tour::new(vec![2, 3, 0, 1], &objective);
    tour.normalize(0);
    assert_eq!(tour.cities, vec![0, 1, 2, 3]);
    assert_eq!(tour.length, 40);

    let length = tour.length;
    tour.evaluate(&objective);
    assert_eq!(tour.length, length);
    assert_eq!(tour.to_string(), "0 1 2 3 (40)");
}

#[test]
fn test_random_tour_is_valid() {
    let problem = Problem::random_euclidean(50, 100.0, 8);
    let mut objective = Objective::new(&problem, 8);

    let first = Tour::random(&mut objective);
    let second = Tour::random(&mut objective);
    assert!(first.is_valid(50));
    assert!(second.is_valid(50));
    assert_ne!(first.cities, second.cities);
    assert!(!Tour::identity(&objective).is_empty());
}

#[test]
fn test_format_duration() {
    assert_eq!(general_utils::format_duration(Duration::from_secs(0)), "0h 00m 00s");
    assert_eq!(
        general_utils::format_duration(Duration::from_secs(7322)),
        "2h 02m 02s"
    );
}
