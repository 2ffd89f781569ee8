pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let cpu_mode = app.collector.cpu_mode();
    let cpu_formula = app.collector.cpu_formula();
    header::render(frame, chunks[0], &app.snapshot, cpu_formula, &app.theme);

    app.visible_rows = process_table::visible_rows(chunks[1]);
    process_table::render(
        frame,
        chunks[1],
        &app.snapshot.processes,
        app.scroll,
        &app.theme,
    );

    statusbar::render(
        frame,
        chunks[2],
        &app.keybinds,
        app.status_message.as_ref(),
        &app.theme,
    );

    // Help overlay last so it sits on top
    if app.show_help() {
        help::render(
            frame,
            frame.area(),
            &app.help_entries(),
            cpu_mode,
            &app.theme,
        );
    }
}

#[cfg(test)]
mod tests;
