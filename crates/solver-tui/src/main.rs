mod app;
mod render;
mod theme;

use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use solver_core::{Grid, SolveOutcome, Solver};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Enter a 9x9 Sudoku puzzle and solve it, in the terminal.
#[derive(Parser)]
#[command(name = "sudoku-solver", version, about)]
struct Cli {
    /// 81-character puzzle (digits, `0` or `.` for empty); solves without the UI
    puzzle: Option<String>,

    /// Wall-clock budget for a solve, in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Print the result as JSON (non-interactive mode only)
    #[arg(long)]
    json: bool,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout);

    if let Some(puzzle) = cli.puzzle {
        solve_once(&puzzle, timeout, cli.json);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Run the app
    let result = run_app(&mut stdout, timeout);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

/// Non-interactive mode: parse, solve, print, exit.
fn solve_once(puzzle: &str, timeout: Duration, json: bool) -> ! {
    let grid = match Grid::from_string(puzzle) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("invalid puzzle: {}", e);
            std::process::exit(2);
        }
    };

    let solver = Solver::new();
    let started = Instant::now();
    let outcome = solver.solve_with_timeout(&grid, timeout);
    let elapsed = started.elapsed();

    let label = match &outcome {
        SolveOutcome::Solved(_) => "solved",
        SolveOutcome::Unsolvable => "unsolvable",
        SolveOutcome::TimedOut => "timed-out",
    };
    log::debug!("cli solve {} in {:?}", label, elapsed);

    if json {
        let grid_string = outcome.grid().map(|g| g.to_string_compact());
        let payload = serde_json::json!({
            "outcome": label,
            "grid": grid_string,
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        println!("{}", payload);
    } else {
        match &outcome {
            SolveOutcome::Solved(solved) => println!("{}", solved),
            SolveOutcome::Unsolvable => eprintln!("no solution exists"),
            SolveOutcome::TimedOut => {
                eprintln!("solving timed out after {} s", timeout.as_secs())
            }
        }
    }

    std::process::exit(if outcome.is_solved() { 0 } else { 1 });
}

fn run_app(stdout: &mut io::Stdout, timeout: Duration) -> io::Result<()> {
    let mut app = App::new(timeout);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render
        render::render(stdout, &app)?;
        stdout.flush()?;

        // Handle input, waking up at the tick rate to poll the solver
        let wait = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        // Tick timers and the in-flight solve
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
