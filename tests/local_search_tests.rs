//! Tests for the local search driver.

use std::f64::consts::PI;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tsp_move_queue::local_search::utils::{is_permutation, tour_length};
use tsp_move_queue::local_search::{
    FillRange, LocalSearch, LocalSearchConfig, MoveOrder, SearchState, SearchStats,
};
use tsp_move_queue::objective::{Objective, TourLength};
use tsp_move_queue::problem::{Node, Problem};
use tsp_move_queue::tour::Tour;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn shuffled(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cities: Vec<usize> = (0..n).collect();
    cities.shuffle(&mut rng);
    cities
}

/// Cities evenly spaced on a circle. Every tour without crossing edges is
/// the hull tour, so every local optimum is the global one.
fn circle_problem(n: usize, radius: f64) -> Problem {
    let nodes = (0..n)
        .map(|k| {
            let angle = 2.0 * PI * k as f64 / n as f64;
            Node::new(k, radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    Problem::new(format!("circle-{}", n), nodes)
}

fn config(order: MoveOrder, cap: usize) -> LocalSearchConfig {
    LocalSearchConfig {
        move_order: order,
        max_move_allocations: cap,
    }
}

fn run_from(
    problem: &Problem,
    cities: &mut Vec<usize>,
    config: LocalSearchConfig,
) -> (TourLength, SearchStats, Vec<TourLength>) {
    let mut objective = Objective::new(problem, 0);
    let mut length = tour_length(cities, &objective);
    let mut local_search = LocalSearch::new(config);
    let stats = local_search.run(cities, &mut length, &mut objective);
    (length, stats, objective.history().to_vec())
}

/// A full scan of the converged tour must find no improving move.
fn assert_local_optimum(problem: &Problem, cities: &[usize], order: MoveOrder) {
    let objective = Objective::new(problem, 0);
    let mut cities = cities.to_vec();
    let mut state = SearchState::new(&mut cities, &objective, &config(order, 1 << 20));
    let outcome = state.fill(&objective, FillRange::Full);
    assert_eq!(outcome.enqueued, 0, "improving move left behind");
    assert!(!outcome.incomplete);
    state.dispose_all();
}

#[test]
fn test_run_is_monotone_and_conserves_length() {
    init_logger();
    for seed in 0..5 {
        let problem = Problem::random_euclidean(120, 10_000.0, seed);
        let mut cities = shuffled(problem.dimension(), seed);
        let objective = Objective::new(&problem, 0);
        let initial = tour_length(&cities, &objective);

        let (length, stats, history) = run_from(&problem, &mut cities, LocalSearchConfig::default());

        assert!(is_permutation(&cities, problem.dimension()));
        assert_eq!(length, tour_length(&cities, &objective));
        assert!(length < initial);
        assert!(!stats.cancelled);
        assert_eq!(history.len(), stats.moves_applied);
        assert_eq!(history.last().copied(), Some(length));

        let mut previous = initial;
        for &candidate in &history {
            assert!(candidate < previous, "length went up: {} -> {}", previous, candidate);
            previous = candidate;
        }
    }
}

#[test]
fn test_converges_to_local_optimum() {
    init_logger();
    for seed in 0..4 {
        let problem = Problem::random_matrix(30, 1000, seed);
        for order in [MoveOrder::BestFirst, MoveOrder::TypeFirst] {
            let mut cities = shuffled(problem.dimension(), seed);
            let (_, stats, _) = run_from(&problem, &mut cities, config(order, 1 << 20));
            assert!(stats.moves_applied > 0);
            assert_local_optimum(&problem, &cities, order);
        }
    }
}

#[test]
fn test_small_pool_still_reaches_local_optimum() {
    init_logger();
    let problem = Problem::random_euclidean(60, 1000.0, 17);
    for cap in [1, 3, 50] {
        let mut cities = shuffled(problem.dimension(), 17);
        let (_, stats, _) = run_from(&problem, &mut cities, config(MoveOrder::BestFirst, cap));
        assert!(stats.peak_live_moves <= cap);
        assert!(stats.incomplete_fills > 0);
        assert_local_optimum(&problem, &cities, MoveOrder::BestFirst);
    }
}

#[test]
fn test_second_run_applies_nothing() {
    let problem = Problem::random_euclidean(80, 1000.0, 3);
    let mut cities = shuffled(problem.dimension(), 3);
    let (first, _, _) = run_from(&problem, &mut cities, LocalSearchConfig::default());
    let converged = cities.clone();

    let (second, stats, history) = run_from(&problem, &mut cities, LocalSearchConfig::default());
    assert_eq!(second, first);
    assert_eq!(cities, converged);
    assert_eq!(stats.moves_applied, 0);
    assert_eq!(stats.fills, 1);
    assert!(history.is_empty());
}

#[test]
fn test_pool_cap_does_not_change_final_quality_on_convex_instance() {
    init_logger();
    let problem = circle_problem(20, 100_000.0);
    let objective = Objective::new(&problem, 0);
    let hull = tour_length(&(0..20).collect::<Vec<_>>(), &objective);

    for seed in 0..3 {
        for cap in [1, 1 << 20] {
            let mut cities = shuffled(20, seed);
            let (length, stats, _) = run_from(&problem, &mut cities, config(MoveOrder::BestFirst, cap));
            assert_eq!(length, hull, "cap {} seed {}", cap, seed);
            assert!(!stats.cancelled);
        }
    }
}

#[test]
fn test_cancellation_leaves_consistent_prefix() {
    init_logger();
    let problem = Problem::random_matrix(25, 1000, 11);
    let start = shuffled(problem.dimension(), 11);
    let initial = tour_length(&start, &Objective::new(&problem, 0));

    let mut cities = start.clone();
    let (_, full, history) = run_from(&problem, &mut cities, LocalSearchConfig::default());
    assert!(!full.cancelled);

    for budget in 0..=history.len() + 1 {
        let mut objective = Objective::new(&problem, 0).with_max_candidates(budget as u64);
        let mut cities = start.clone();
        let mut length = initial;
        let mut local_search = LocalSearch::new(LocalSearchConfig::default());
        let stats = local_search.run(&mut cities, &mut length, &mut objective);

        let expected_moves = budget.min(history.len());
        assert_eq!(stats.moves_applied, expected_moves);
        assert_eq!(stats.cancelled, budget <= history.len());
        let expected = match expected_moves {
            0 => initial,
            k => history[k - 1],
        };
        assert_eq!(length, expected, "budget {}", budget);
        assert_eq!(tour_length(&cities, &objective), length);
        assert!(is_permutation(&cities, problem.dimension()));
    }
}

#[test]
fn test_three_cities_have_no_moves() {
    let problem = Problem::random_matrix(3, 100, 1);
    let mut objective = Objective::new(&problem, 0);
    let mut tour = Tour::new(vec![2, 0, 1], &objective);
    let before = tour.clone();

    let stats = LocalSearch::new(LocalSearchConfig::default()).improve(&mut tour, &mut objective);
    assert_eq!(tour, before);
    assert_eq!(stats, SearchStats::default());
    assert_eq!(objective.candidates(), 0);
}

#[test]
fn test_four_city_crossing_is_removed() {
    let nodes = vec![
        Node::new(0, 0.0, 0.0),
        Node::new(1, 10.0, 0.0),
        Node::new(2, 10.0, 10.0),
        Node::new(3, 0.0, 10.0),
    ];
    let problem = Problem::new("square".to_string(), nodes);
    let mut objective = Objective::new(&problem, 0);
    let mut tour = Tour::new(vec![0, 2, 1, 3], &objective);
    assert_eq!(tour.length, 48);

    let stats = LocalSearch::new(LocalSearchConfig::default()).improve(&mut tour, &mut objective);
    assert_eq!(tour.length, 40);
    assert_eq!(stats.moves_applied, 1);
    assert!(tour.is_valid(4));
}

#[test]
fn test_tiny_tours_only_enqueue_admissible_windows() {
    for n in 4..=7 {
        for seed in 0..20 {
            let problem = Problem::random_matrix(n, 100, seed);
            let objective = Objective::new(&problem, 0);
            let mut cities = shuffled(n, seed);
            let mut state = SearchState::new(&mut cities, &objective, &LocalSearchConfig::default());
            state.fill(&objective, FillRange::Full);
            for record in state.queue().iter() {
                assert!(record.kind.admits(record.i, record.j, n), "{:?}", record);
                assert!((record.i, record.j) != (0, n - 1));
            }
            state.dispose_all();

            let (length, _, _) = run_from(&problem, &mut cities, LocalSearchConfig::default());
            assert_eq!(length, tour_length(&cities, &objective));
            assert_local_optimum(&problem, &cities, MoveOrder::BestFirst);
        }
    }
}

#[test]
fn test_queue_rewrites_and_drops_moves_on_large_instance() {
    init_logger();
    let problem = Problem::random_euclidean(200, 10_000.0, 5);
    let mut cities = shuffled(problem.dimension(), 5);
    let (_, stats, _) = run_from(&problem, &mut cities, LocalSearchConfig::default());

    assert!(stats.moves_transformed > 0);
    assert!(stats.moves_deleted > 0);
    assert!(stats.fills > stats.full_fills);
    assert!(stats.peak_live_moves >= 1);
}
