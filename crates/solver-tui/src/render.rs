use crate::app::App;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use solver_core::Position;
use std::io;

const GRID_WIDTH: u16 = 37;
const GRID_HEIGHT: u16 = 19;
const PANEL_WIDTH: u16 = 25;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    let total_width = GRID_WIDTH + PANEL_WIDTH;
    let start_x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let start_y = if term_height > GRID_HEIGHT + 6 { 2 } else { 1 };

    render_grid(stdout, app, start_x, start_y)?;
    render_info_panel(stdout, app, start_x + GRID_WIDTH + 3, start_y)?;
    render_controls(stdout, app, start_x, start_y + GRID_HEIGHT + 1)?;

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width, start_y + GRID_HEIGHT + 3)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn render_grid(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    // Grid layout, 37x19:
    // +===+===+===+===+===+===+===+===+===+
    // | 5 | 3 | . | . | 7 | . | . | . | . |
    // Thick separators at the 3x3 box boundaries.
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.box_border),
        Print("+===+===+===+===+===+===+===+===+===+")
    )?;

    for row in 0..9 {
        let cell_y = y + 1 + row as u16 * 2;
        execute!(stdout, MoveTo(x, cell_y))?;

        for col in 0..9 {
            if col % 3 == 0 {
                execute!(stdout, SetForegroundColor(theme.box_border), Print("|"))?;
            } else {
                execute!(stdout, SetForegroundColor(theme.border), Print("|"))?;
            }
            render_cell(stdout, app, Position::new(row, col))?;
        }
        execute!(stdout, SetForegroundColor(theme.box_border), Print("|"))?;

        execute!(stdout, MoveTo(x, cell_y + 1))?;
        if (row + 1) % 3 == 0 {
            execute!(
                stdout,
                SetForegroundColor(theme.box_border),
                Print("+===+===+===+===+===+===+===+===+===+")
            )?;
        } else {
            execute!(
                stdout,
                SetForegroundColor(theme.border),
                Print("+---+---+---+---+---+---+---+---+---+")
            )?;
        }
    }

    Ok(())
}

fn render_cell(stdout: &mut io::Stdout, app: &App, pos: Position) -> io::Result<()> {
    let theme = &app.theme;
    let cell = app.grid.cell(pos);

    let bg = if pos == app.cursor {
        theme.selected_bg
    } else {
        theme.bg
    };

    let (text, fg) = match cell.value() {
        Some(v) if app.has_conflict(pos) => (format!(" {} ", v), theme.error),
        Some(v) if cell.is_given() => (format!(" {} ", v), theme.given),
        // Solver-filled cells get the "solved" highlight.
        Some(v) => (format!(" {} ", v), theme.solved),
        None => (" . ".to_string(), theme.empty),
    };

    execute!(
        stdout,
        SetBackgroundColor(bg),
        SetForegroundColor(fg),
        Print(text),
        SetBackgroundColor(theme.bg)
    )?;
    Ok(())
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.fg),
        Print("SUDOKU SOLVER")
    )?;

    let status = if app.is_solving() {
        let secs = app.solving_elapsed().unwrap_or_default().as_secs();
        format!("Solving... {} s", secs)
    } else if let Some(elapsed) = app.last_solve {
        format!("Solved in {} ms", elapsed.as_millis())
    } else {
        "Editing".to_string()
    };
    execute!(
        stdout,
        MoveTo(x, y + 2),
        SetForegroundColor(theme.info),
        Print(format!("Status:  {}", status))
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 3),
        SetForegroundColor(theme.info),
        Print(format!("Timeout: {} s", app.timeout.as_secs()))
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 5),
        SetForegroundColor(theme.info),
        Print(format!("Entered: {:>2}", app.grid.given_count()))
    )?;
    execute!(
        stdout,
        MoveTo(x, y + 6),
        SetForegroundColor(theme.info),
        Print(format!("Empty:   {:>2}", app.grid.empty_count()))
    )?;

    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let bindings: [(&str, &str); 6] = [
        ("arrows", "move"),
        ("1-9", "place"),
        ("0", "erase"),
        ("s", "solve"),
        ("c", "clear"),
        ("q", "quit"),
    ];

    execute!(stdout, MoveTo(x, y))?;
    for (i, (keys, action)) in bindings.iter().enumerate() {
        if i > 0 {
            execute!(stdout, SetForegroundColor(theme.border), Print("  "))?;
        }
        execute!(
            stdout,
            SetForegroundColor(theme.key),
            Print(*keys),
            SetForegroundColor(theme.info),
            Print(format!(" {}", action))
        )?;
    }
    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let x = if term_width > msg.len() as u16 {
        (term_width - msg.len() as u16) / 2
    } else {
        0
    };
    let color = if msg.starts_with("No solution") || msg.contains("timed out") {
        theme.error
    } else {
        theme.success
    };
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(color),
        Print(msg)
    )?;
    Ok(())
}
