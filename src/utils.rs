//! Utility functions and structures for reporting search results.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::local_search::SearchStats;
use crate::problem::Problem;
use crate::tour::Tour;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a tour in TSPLIB `TOUR_SECTION` format (1-based city ids).
pub fn save_tour<P: AsRef<Path>>(tour: &Tour, problem: &Problem, path: P) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "NAME : {}.tour", problem.name)?;
    writeln!(file, "COMMENT : Length = {}", tour.length)?;
    writeln!(file, "TYPE : TOUR")?;
    writeln!(file, "DIMENSION : {}", tour.len())?;
    writeln!(file, "TOUR_SECTION")?;
    for &city in &tour.cities {
        writeln!(file, "{}", city + 1)?;
    }
    writeln!(file, "-1")?;
    writeln!(file, "EOF")?;

    Ok(())
}

/// Summary of a solver run.
pub struct SearchStatistics {
    pub restarts: usize,
    pub runtime: Duration,
    pub best_length: i64,
    pub evaluations: u64,
    pub moves_applied: usize,
    pub moves_deleted: usize,
    pub moves_transformed: usize,
    pub fills: usize,
    pub incomplete_fills: usize,
    pub peak_live_moves: usize,
}

impl SearchStatistics {
    /// Aggregate the per-run counters of a solver.
    pub fn from_runs(runs: &[SearchStats], best_length: i64, runtime: Duration, evaluations: u64) -> Self {
        SearchStatistics {
            restarts: runs.len(),
            runtime,
            best_length,
            evaluations,
            moves_applied: runs.iter().map(|r| r.moves_applied).sum(),
            moves_deleted: runs.iter().map(|r| r.moves_deleted).sum(),
            moves_transformed: runs.iter().map(|r| r.moves_transformed).sum(),
            fills: runs.iter().map(|r| r.fills).sum(),
            incomplete_fills: runs.iter().map(|r| r.incomplete_fills).sum(),
            peak_live_moves: runs.iter().map(|r| r.peak_live_moves).max().unwrap_or(0),
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Restarts: {}
- Runtime: {}
- Best Tour Length: {}
- Distance Evaluations: {}
- Moves Applied: {}
- Moves Deleted: {}
- Moves Transformed: {}
- Fill Passes: {} ({} incomplete)
- Peak Live Moves: {}",
            self.restarts,
            format_duration(self.runtime),
            self.best_length,
            self.evaluations,
            self.moves_applied,
            self.moves_deleted,
            self.moves_transformed,
            self.fills,
            self.incomplete_fills,
            self.peak_live_moves
        )
    }
}
