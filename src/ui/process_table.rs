use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};

use crate::format::{elapsed_time, truncate_unicode};
use crate::system::process::ProcessSnapshot;
use crate::ui::theme::Theme;

const PID_WIDTH: u16 = 7;
const USER_WIDTH: u16 = 10;
const CPU_WIDTH: u16 = 6;
const RAM_WIDTH: u16 = 8;
const TIME_WIDTH: u16 = 10;
const COLUMN_SPACING: u16 = 1;
/// CPU% at or above which the cell is highlighted.
const HOT_CPU_PERCENT: f32 = 50.0;

/// Number of process rows that fit in `area` (borders and header excluded).
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

/// Renders `processes[scroll..]`. Only rows that fit are read from the system.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessSnapshot],
    scroll: usize,
    theme: &Theme,
) {
    let fixed = PID_WIDTH + USER_WIDTH + CPU_WIDTH + RAM_WIDTH + TIME_WIDTH + COLUMN_SPACING * 5;
    let command_width = area.width.saturating_sub(2).saturating_sub(fixed) as usize;

    let header_style = Style::default()
        .fg(theme.table_header_fg)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(["PID", "USER", "CPU%", "RAM[MB]", "TIME+", "COMMAND"]).style(header_style);

    let start = scroll.min(processes.len());
    let rows: Vec<Row> = processes[start..]
        .iter()
        .take(visible_rows(area))
        .map(|process| {
            let cpu = process.cpu_utilization();
            let cpu_cell = Cell::from(format!("{cpu:>5.1}"));
            let cpu_cell = if cpu >= HOT_CPU_PERCENT {
                cpu_cell.style(Style::default().fg(theme.cpu_hot))
            } else {
                cpu_cell
            };
            Row::new(vec![
                Cell::from(format!("{:>w$}", process.pid(), w = PID_WIDTH as usize)),
                Cell::from(truncate_unicode(&process.user(), USER_WIDTH as usize)),
                cpu_cell,
                Cell::from(format!("{:>w$}", process.ram(), w = RAM_WIDTH as usize)),
                Cell::from(elapsed_time(process.uptime())),
                Cell::from(truncate_unicode(process.command().trim_end(), command_width)),
            ])
            .style(Style::default().fg(theme.text_primary))
        })
        .collect();

    let first = if rows.is_empty() { start } else { start + 1 };
    let title = format!(
        " Processes {first}-{} of {} ",
        start + rows.len(),
        processes.len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(title, Style::default().fg(theme.accent)));

    let widths = [
        Constraint::Length(PID_WIDTH),
        Constraint::Length(USER_WIDTH),
        Constraint::Length(CPU_WIDTH),
        Constraint::Length(RAM_WIDTH),
        Constraint::Length(TIME_WIDTH),
        Constraint::Min(0),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING);

    frame.render_widget(table, area);
}
