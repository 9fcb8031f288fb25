use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use solver_core::{Grid, Position, SolveJob, SolveOutcome, Solver};
use std::time::{Duration, Instant};

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// The main application state
pub struct App {
    /// The board being edited
    pub grid: Grid,
    /// Currently selected cell position
    pub cursor: Position,
    /// Color theme
    pub theme: Theme,
    /// Whether the dark theme is active
    dark_theme: bool,
    /// Wall-clock budget for a solve
    pub timeout: Duration,
    /// In-flight solve, if any
    job: Option<SolveJob>,
    /// When the in-flight solve started
    solve_started: Option<Instant>,
    /// How long the last successful solve took
    pub last_solve: Option<Duration>,
    /// Message to display
    pub message: Option<String>,
    /// Message timer
    message_timer: u32,
}

impl App {
    /// Create a new app with an empty board.
    pub fn new(timeout: Duration) -> Self {
        Self {
            grid: Grid::empty(),
            cursor: Position::new(4, 4),
            theme: Theme::dark(),
            dark_theme: true,
            timeout,
            job: None,
            solve_started: None,
            last_solve: None,
            message: None,
            message_timer: 0,
        }
    }

    /// Whether a solve is running.
    pub fn is_solving(&self) -> bool {
        self.job.is_some()
    }

    /// Seconds the in-flight solve has been running.
    pub fn solving_elapsed(&self) -> Option<Duration> {
        self.solve_started.map(|t| t.elapsed())
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms poll
    }

    /// Whether the digit at `pos` collides with another in its row, column,
    /// or box. Drives the per-move conflict highlight.
    pub fn has_conflict(&self, pos: Position) -> bool {
        let Some(value) = self.grid.get(pos) else {
            return false;
        };
        let values = self.grid.values();

        for col in 0..9 {
            if col != pos.col && values[pos.row][col] == Some(value) {
                return true;
            }
        }
        for row in 0..9 {
            if row != pos.row && values[row][pos.col] == Some(value) {
                return true;
            }
        }
        let box_row = (pos.row / 3) * 3;
        let box_col = (pos.col / 3) * 3;
        for row in box_row..box_row + 3 {
            for col in box_col..box_col + 3 {
                if (row != pos.row || col != pos.col) && values[row][col] == Some(value) {
                    return true;
                }
            }
        }
        false
    }

    /// Advance timers and poll the in-flight solve (called every tick).
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        let Some(job) = self.job.as_mut() else {
            return;
        };
        let Some(outcome) = job.poll() else {
            return;
        };
        self.job = None;
        let elapsed = self.solve_started.take().map(|t| t.elapsed());

        match outcome {
            SolveOutcome::Solved(solved) => {
                self.grid = solved;
                self.last_solve = elapsed;
                let ms = elapsed.unwrap_or_default().as_millis();
                self.show_message(&format!("Solved in {} ms", ms));
            }
            SolveOutcome::Unsolvable => self.show_message("No solution exists"),
            SolveOutcome::TimedOut => {
                self.show_message(&format!(
                    "Solving timed out after {} s",
                    self.timeout.as_secs()
                ));
            }
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Up => self.cursor.row = (self.cursor.row + 8) % 9,
            KeyCode::Down => self.cursor.row = (self.cursor.row + 1) % 9,
            KeyCode::Left => self.cursor.col = (self.cursor.col + 8) % 9,
            KeyCode::Right => self.cursor.col = (self.cursor.col + 1) % 9,
            KeyCode::Char('t') => self.toggle_theme(),
            // The board is read-only while the worker runs.
            _ if self.is_solving() => {}
            KeyCode::Char(c @ '1'..='9') => {
                self.grid.set_given(self.cursor, Some(c as u8 - b'0'));
            }
            KeyCode::Char('0') | KeyCode::Char(' ') | KeyCode::Backspace | KeyCode::Delete => {
                self.grid.set_given(self.cursor, None);
            }
            KeyCode::Char('s') | KeyCode::Enter => self.start_solve(),
            KeyCode::Char('c') => {
                self.grid = Grid::empty();
                self.last_solve = None;
                self.show_message("Board cleared");
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn start_solve(&mut self) {
        let solver = Solver::new();
        self.job = Some(solver.spawn(&self.grid, self.timeout));
        self.solve_started = Some(Instant::now());
        self.show_message("Solving...");
    }

    fn toggle_theme(&mut self) {
        self.dark_theme = !self.dark_theme;
        self.theme = if self.dark_theme {
            Theme::dark()
        } else {
            Theme::light()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cursor_wraps_at_edges() {
        let mut app = App::new(Duration::from_secs(5));
        assert_eq!(app.cursor, Position::new(4, 4));

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Left));
        }
        assert_eq!(app.cursor.col, 8);

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Up));
        }
        assert_eq!(app.cursor.row, 8);

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.cursor.row, 0);
    }

    #[test]
    fn test_digit_entry_marks_given() {
        let mut app = App::new(Duration::from_secs(5));
        app.handle_key(key(KeyCode::Char('7')));
        assert_eq!(app.grid.get(Position::new(4, 4)), Some(7));
        assert!(app.grid.cell(Position::new(4, 4)).is_given());

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.grid.get(Position::new(4, 4)), None);
    }

    #[test]
    fn test_non_digit_input_is_ignored() {
        let mut app = App::new(Duration::from_secs(5));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.grid.empty_count(), 81);
    }

    #[test]
    fn test_clear_board() {
        let mut app = App::new(Duration::from_secs(5));
        app.handle_key(key(KeyCode::Char('3')));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.grid.empty_count(), 81);
    }

    #[test]
    fn test_conflict_detection_for_entered_digits() {
        let mut app = App::new(Duration::from_secs(5));
        app.grid.set_given(Position::new(0, 0), Some(5));
        app.grid.set_given(Position::new(0, 7), Some(5));
        app.grid.set_given(Position::new(5, 5), Some(5));

        assert!(app.has_conflict(Position::new(0, 0)));
        assert!(app.has_conflict(Position::new(0, 7)));
        assert!(!app.has_conflict(Position::new(5, 5)));
        assert!(!app.has_conflict(Position::new(3, 3)));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(Duration::from_secs(5));
        assert!(matches!(app.handle_key(key(KeyCode::Char('q'))), AppAction::Quit));
        assert!(matches!(app.handle_key(key(KeyCode::Esc)), AppAction::Quit));
    }
}
