//! Basic example of using the solver engine

use solver_core::{Grid, Solver};
use std::time::Duration;

fn main() {
    let puzzle_string =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    let grid = match Grid::from_string(puzzle_string) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("bad puzzle: {}", e);
            return;
        }
    };

    println!("Puzzle ({} givens):", grid.given_count());
    println!("{}", grid);

    println!("Solving with a 5 second budget...\n");
    let solver = Solver::new();
    match solver.solve_with_timeout(&grid, Duration::from_secs(5)) {
        solver_core::SolveOutcome::Solved(solution) => {
            println!("Solution:");
            println!("{}", solution);
        }
        solver_core::SolveOutcome::Unsolvable => println!("No solution exists."),
        solver_core::SolveOutcome::TimedOut => println!("Ran out of time."),
    }
}
