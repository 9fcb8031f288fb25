//! Deadline-bounded Sudoku solving.
//!
//! The search itself lives in [`backtrack`]; this module owns the public
//! surface: the [`Solver`] entry points, the tagged [`SolveOutcome`], and
//! the worker-thread plumbing behind the wall-clock timeout.

mod backtrack;

pub use backtrack::{count_conflicts, find_empty_with_mrv};

use crate::grid::Grid;
use backtrack::Search;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a solve request.
///
/// `Unsolvable` and `TimedOut` are distinct on purpose: a caller can tell
/// "this puzzle has no completion" apart from "the time budget ran out
/// first".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveOutcome {
    /// The search completed; the grid is fully filled.
    Solved(Grid),
    /// The search exhausted every branch without completing the grid.
    Unsolvable,
    /// The wall-clock budget elapsed before the search finished.
    TimedOut,
}

impl SolveOutcome {
    /// True for `Solved`.
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    /// The solved grid, if any.
    pub fn grid(&self) -> Option<&Grid> {
        match self {
            SolveOutcome::Solved(grid) => Some(grid),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SolveOutcome::Solved(_) => "solved",
            SolveOutcome::Unsolvable => "unsolvable",
            SolveOutcome::TimedOut => "timed-out",
        }
    }
}

fn outcome_of(search: Search, working: Grid) -> SolveOutcome {
    match search {
        Search::Solved => SolveOutcome::Solved(working),
        Search::Exhausted => SolveOutcome::Unsolvable,
        Search::Expired => SolveOutcome::TimedOut,
    }
}

/// Configuration for the solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget for a solve call.
    pub timeout: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Backtracking Sudoku solver with MRV cell selection and conflict-ordered
/// digit trials.
///
/// Every entry point searches a private copy of the caller's grid; the
/// input is never mutated, so a timed-out or failed solve leaves the
/// caller's board exactly as it was.
pub struct Solver {
    config: SolverConfig,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Create a solver with custom configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve on the calling thread, bounded by the configured timeout.
    pub fn solve(&self, grid: &Grid) -> SolveOutcome {
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        let mut working = grid.clone();
        let outcome = outcome_of(backtrack::solve_recursive(&mut working, deadline), working);
        debug!("solve {} in {:?}", outcome.label(), started.elapsed());
        outcome
    }

    /// Start a solve on a worker thread and return a handle to it.
    ///
    /// The worker owns a private copy of the grid. Dropping the handle (or
    /// letting it time out) detaches the worker: it finishes unwinding on
    /// its own schedule and its result is discarded.
    pub fn spawn(&self, grid: &Grid, timeout: Duration) -> SolveJob {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut working = grid.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let outcome = outcome_of(backtrack::solve_recursive(&mut working, deadline), working);
            debug!("worker {} in {:?}", outcome.label(), started.elapsed());
            // The receiver may have given up already; nothing to do then.
            let _ = tx.send(outcome);
        });
        SolveJob {
            rx,
            deadline,
            done: false,
        }
    }

    /// Solve on a worker thread, blocking the caller for at most `timeout`.
    ///
    /// If the outer wait expires before the worker reports, the result is
    /// `TimedOut` and the worker is not waited for.
    pub fn solve_with_timeout(&self, grid: &Grid, timeout: Duration) -> SolveOutcome {
        self.spawn(grid, timeout).wait()
    }
}

/// Handle to an in-flight solve on a worker thread.
pub struct SolveJob {
    rx: Receiver<SolveOutcome>,
    deadline: Instant,
    done: bool,
}

impl SolveJob {
    /// Non-blocking check on the worker.
    ///
    /// Yields the outcome exactly once: the worker's result, or `TimedOut`
    /// as soon as the deadline passes without one. Returns `None` while the
    /// worker is still inside its budget, and forever after the outcome has
    /// been yielded.
    pub fn poll(&mut self) -> Option<SolveOutcome> {
        if self.done {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => {
                if Instant::now() < self.deadline {
                    return None;
                }
                SolveOutcome::TimedOut
            }
            // The worker vanished without reporting; all the caller can
            // know is that the solve did not finish.
            Err(TryRecvError::Disconnected) => SolveOutcome::TimedOut,
        };
        self.done = true;
        Some(outcome)
    }

    /// Block until the worker reports or the deadline passes, whichever
    /// comes first. The worker is never joined past the deadline.
    pub fn wait(self) -> SolveOutcome {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(remaining) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                SolveOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    const EASY: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    const EASY_SOLUTION: &str =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

    /// Assert every row, column, and box holds each digit exactly once.
    fn assert_valid_solution(grid: &Grid) {
        assert!(grid.is_complete());
        for i in 0..9 {
            let mut row_seen = [false; 10];
            let mut col_seen = [false; 10];
            let mut box_seen = [false; 10];
            for j in 0..9 {
                let row_digit = grid.get(Position::new(i, j)).unwrap() as usize;
                assert!(!row_seen[row_digit], "duplicate in row {}", i);
                row_seen[row_digit] = true;

                let col_digit = grid.get(Position::new(j, i)).unwrap() as usize;
                assert!(!col_seen[col_digit], "duplicate in column {}", i);
                col_seen[col_digit] = true;

                let pos = Position::new((i / 3) * 3 + j / 3, (i % 3) * 3 + j % 3);
                let box_digit = grid.get(pos).unwrap() as usize;
                assert!(!box_seen[box_digit], "duplicate in box {}", i);
                box_seen[box_digit] = true;
            }
        }
    }

    #[test]
    fn test_known_puzzle_yields_known_solution() {
        let grid = Grid::from_string(EASY).unwrap();
        let solver = Solver::new();

        let outcome = solver.solve(&grid);
        let solved = outcome.grid().expect("easy puzzle should solve");
        assert_valid_solution(solved);
        assert_eq!(solved.to_string_compact(), EASY_SOLUTION);
    }

    #[test]
    fn test_solving_is_deterministic() {
        let grid = Grid::from_string(EASY).unwrap();
        let solver = Solver::new();
        let first = solver.solve(&grid);
        let second = solver.solve(&grid);
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_grid_is_never_mutated() {
        let grid = Grid::from_string(EASY).unwrap();
        let before = grid.clone();
        let solver = Solver::new();
        let _ = solver.solve(&grid);
        let _ = solver.solve_with_timeout(&grid, Duration::ZERO);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_solved_input_is_idempotent() {
        let grid = Grid::from_string(EASY_SOLUTION).unwrap();
        let solver = Solver::new();
        match solver.solve(&grid) {
            SolveOutcome::Solved(solved) => {
                assert_eq!(solved.to_string_compact(), grid.to_string_compact())
            }
            other => panic!("expected Solved, got {:?}", other),
        }
    }

    #[test]
    fn test_solve_preserves_given_flags() {
        let grid = Grid::from_string(EASY).unwrap();
        let solver = Solver::new();
        let outcome = solver.solve(&grid);
        let solved = outcome.grid().unwrap();

        for row in 0..9 {
            for col in 0..9 {
                let pos = Position::new(row, col);
                if grid.cell(pos).is_given() {
                    assert!(solved.cell(pos).is_given());
                    assert_eq!(solved.get(pos), grid.get(pos));
                } else {
                    assert!(!solved.cell(pos).is_given());
                }
            }
        }
    }

    #[test]
    fn test_zero_candidate_grid_is_unsolvable() {
        // Row 0 holds 1-8; the 9 in column 8 leaves (0,8) with no candidate.
        let mut grid = Grid::empty();
        for (col, digit) in (0..8).zip(1..=8) {
            grid.set_given(Position::new(0, col), Some(digit));
        }
        grid.set_given(Position::new(4, 8), Some(9));

        let solver = Solver::new();
        assert_eq!(solver.solve(&grid), SolveOutcome::Unsolvable);
    }

    #[test]
    fn test_duplicate_givens_never_solve() {
        // Two 5s in an otherwise-empty row: no completion exists (a full
        // duplicate-free grid needs nine 5s, this forces ten), but proving
        // that by search is enormous. A short budget must report TimedOut.
        let mut grid = Grid::empty();
        grid.set_given(Position::new(0, 0), Some(5));
        grid.set_given(Position::new(0, 8), Some(5));

        let solver = Solver::new();
        let outcome = solver.solve_with_timeout(&grid, Duration::from_millis(1));
        assert!(!outcome.is_solved());
    }

    #[test]
    fn test_zero_timeout_reports_timed_out_promptly() {
        let grid = Grid::from_string(EASY).unwrap();
        let solver = Solver::new();

        let started = Instant::now();
        let outcome = solver.solve_with_timeout(&grid, Duration::ZERO);
        assert_eq!(outcome, SolveOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_empty_grid_solves_within_budget() {
        let solver = Solver::new();
        let outcome = solver.solve_with_timeout(&Grid::empty(), Duration::from_secs(30));
        let solved = outcome.grid().expect("empty grid should solve");
        assert_valid_solution(solved);
    }

    #[test]
    fn test_job_poll_yields_outcome_once() {
        let grid = Grid::from_string(EASY).unwrap();
        let solver = Solver::new();
        let mut job = solver.spawn(&grid, Duration::from_secs(30));

        let outcome = loop {
            if let Some(outcome) = job.poll() {
                break outcome;
            }
            thread::sleep(Duration::from_millis(5));
        };
        assert!(outcome.is_solved());
        assert_eq!(job.poll(), None);
    }

    #[test]
    fn test_outcome_serializes() {
        let solver = Solver::new();
        let outcome = solver.solve(&Grid::from_string(EASY).unwrap());
        let json = serde_json::to_string(&outcome).unwrap();
        let back: SolveOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
