use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::format::{elapsed_time, format_percent};
use crate::system::cpu::CpuMode;
use crate::system::snapshot::SystemSnapshot;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: &SystemSnapshot,
    cpu_mode: CpuMode,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    render_system_info(frame, chunks[0], snapshot, theme);
    render_gauge(
        frame,
        chunks[1],
        &format!(" CPU ({}) ", cpu_mode.label()),
        snapshot.cpu_utilization,
        theme,
    );
    render_gauge(frame, chunks[2], " Memory ", snapshot.memory_utilization, theme);
}

fn render_system_info(frame: &mut Frame, area: Rect, snapshot: &SystemSnapshot, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = Style::default().fg(theme.text_secondary);
    let value = Style::default().fg(theme.text_primary);

    let first = Line::from(vec![
        Span::styled(
            " proctop ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(snapshot.os_name.as_str(), value),
        Span::styled("  Kernel ", label),
        Span::styled(snapshot.kernel.as_str(), value),
    ]);
    let second = Line::from(vec![
        Span::styled("Procs ", label),
        Span::styled(snapshot.total_processes.to_string(), value),
        Span::styled("  Running ", label),
        Span::styled(snapshot.running_processes.to_string(), value),
        Span::styled("  Up ", label),
        Span::styled(elapsed_time(snapshot.uptime_seconds), value),
    ]);

    frame.render_widget(Paragraph::new(vec![first, second]), inner);
}

fn render_gauge(frame: &mut Frame, area: Rect, title: &str, fraction: f32, theme: &Theme) {
    let ratio = if fraction.is_finite() {
        f64::from(fraction).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        .ratio(ratio)
        .label(format_percent(ratio as f32));

    frame.render_widget(gauge, area);
}
