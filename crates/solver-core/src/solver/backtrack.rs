//! The deadline-bounded backtracking search.

use crate::grid::{Grid, Position};
use std::cmp::Reverse;
use std::time::Instant;

/// Result of one recursive search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Search {
    /// Every cell is filled.
    Solved,
    /// Every branch below this point was tried and failed.
    Exhausted,
    /// The deadline passed before the search finished.
    Expired,
}

/// Count occupied cells already holding `digit` around `pos`: one per index
/// where the row cell or the column cell holds it, plus one per box cell
/// holding it. Box cells that share the row or column count twice.
///
/// Ordering heuristic only; [`Grid::is_safe`] is the correctness check.
pub fn count_conflicts(grid: &Grid, pos: Position, digit: u8) -> usize {
    let mut conflicts = 0;
    for x in 0..9 {
        if grid.get(Position::new(pos.row, x)) == Some(digit)
            || grid.get(Position::new(x, pos.col)) == Some(digit)
        {
            conflicts += 1;
        }
    }
    let origin = pos.box_origin();
    for row in origin.row..origin.row + 3 {
        for col in origin.col..origin.col + 3 {
            if grid.get(Position::new(row, col)) == Some(digit) {
                conflicts += 1;
            }
        }
    }
    conflicts
}

/// Minimum-remaining-values cell selection: the empty cell with the fewest
/// safe digits, ties broken by first-found in row-major order. `None` means
/// the grid is full.
///
/// A zero-candidate cell is a valid selection; trying it exhausts the branch
/// immediately, which is exactly the early pruning the heuristic is for.
pub fn find_empty_with_mrv(grid: &Grid) -> Option<Position> {
    let mut best: Option<(Position, u32)> = None;
    for row in 0..9 {
        for col in 0..9 {
            let pos = Position::new(row, col);
            if grid.get(pos).is_some() {
                continue;
            }
            let options = grid.compute_candidates(pos).count();
            match best {
                Some((_, fewest)) if options >= fewest => {}
                _ => best = Some((pos, options)),
            }
        }
    }
    best.map(|(pos, _)| pos)
}

/// Digits 1-9 ordered most-conflicted first, so trials likely to dead-end
/// elsewhere fail fast. The sort is stable: ties stay in ascending digit
/// order.
pub(crate) fn conflict_ordered_digits(grid: &Grid, pos: Position) -> [u8; 9] {
    let mut digits: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
    digits.sort_by_key(|&d| Reverse(count_conflicts(grid, pos, d)));
    digits
}

/// Chronological backtracking with MRV cell selection and conflict-ordered
/// digit trials.
///
/// The deadline is checked once per entry, never between the nine digit
/// trials of a single level, so the time bound is approximate by one level
/// of work. Trial digits are retracted on the way out; a `Solved` result
/// leaves the grid fully filled.
pub(crate) fn solve_recursive(grid: &mut Grid, deadline: Instant) -> Search {
    if Instant::now() >= deadline {
        return Search::Expired;
    }

    let Some(pos) = find_empty_with_mrv(grid) else {
        return Search::Solved;
    };

    for digit in conflict_ordered_digits(grid, pos) {
        if !grid.is_safe(pos, digit) {
            continue;
        }
        grid.set_cell_unchecked(pos, Some(digit));
        match solve_recursive(grid, deadline) {
            Search::Solved => return Search::Solved,
            Search::Exhausted => grid.set_cell_unchecked(pos, None),
            Search::Expired => {
                grid.set_cell_unchecked(pos, None);
                return Search::Expired;
            }
        }
    }

    Search::Exhausted
}
