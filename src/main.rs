//! Command line front end for the move-queue TSP local search.

use clap::{Parser, ValueEnum};
use log::info;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use tsp_move_queue::config::Config;
use tsp_move_queue::problem::Problem;
use tsp_move_queue::utils::{save_tour, SearchStatistics};
use tsp_move_queue::{MoveOrder, Solver};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    /// Apply the most improving move first
    BestFirst,
    /// Prefer 2-opt, then 3-opt, then 4-opt moves
    TypeFirst,
}

impl From<Order> for MoveOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::BestFirst => MoveOrder::BestFirst,
            Order::TypeFirst => MoveOrder::TypeFirst,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tsp-queue", about = "Joint 2-opt/3-opt/4-opt local search for the TSP")]
struct Args {
    /// TSPLIB instance (EUC_2D); a random instance is generated when omitted
    instance: Option<PathBuf>,

    /// Number of cities of the random instance
    #[arg(long, default_value_t = 200)]
    cities: usize,

    /// Random seed for instance generation and starting tours
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Move ordering policy
    #[arg(long, value_enum, default_value_t = Order::BestFirst)]
    order: Order,

    /// Cap on live move records
    #[arg(long)]
    max_allocations: Option<usize>,

    /// Number of random restarts
    #[arg(long, default_value_t = 1)]
    restarts: usize,

    /// Time limit in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Write the best tour in TSPLIB format
    #[arg(long)]
    tour_out: Option<PathBuf>,

    /// Write the best tour and run statistics as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let problem = match &args.instance {
        Some(path) => {
            info!("Loading problem from: {}", path.display());
            Problem::from_file(path)?
        }
        None => Problem::random_euclidean(args.cities, 10_000.0, args.seed),
    };
    println!(
        "Loaded problem: {} with {} cities",
        problem.name,
        problem.dimension()
    );

    let mut config = Config::new()
        .with_move_order(args.order.into())
        .with_restarts(args.restarts)
        .with_seed(args.seed);
    if let Some(cap) = args.max_allocations {
        config = config.with_max_move_allocations(cap);
    }
    if let Some(secs) = args.time_limit {
        config = config.with_time_limit(Duration::from_secs(secs));
    }

    let mut solver = Solver::new(problem, config);
    let best = solver.run().cloned().ok_or("no tour produced")?;

    let statistics = SearchStatistics::from_runs(
        &solver.runs,
        best.length,
        solver.run_time,
        solver.evaluations,
    );
    println!("{}", statistics.format());

    if let Some(path) = &args.tour_out {
        save_tour(&best, &solver.problem, path)?;
        println!("Saved tour to: {}", path.display());
    }
    if let Some(path) = &args.json_out {
        let report = serde_json::json!({
            "name": solver.problem.name,
            "config": solver.config,
            "tour": best,
            "runs": solver.runs,
        });
        serde_json::to_writer_pretty(File::create(path)?, &report)?;
        println!("Saved report to: {}", path.display());
    }

    Ok(())
}
