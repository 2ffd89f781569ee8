use std::sync::Arc;
use std::time::Instant;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::app::{App, ResolvedKeybinds};
use crate::config::{Config, KeybindsConfig};
use crate::system::collector::Collector;
use crate::system::cpu::CpuMode;
use crate::system::mock::MockFs;
use crate::system::reader::ProcPaths;
use crate::system::snapshot::SystemSnapshot;
use crate::ui::theme::Theme;
use crate::ui::{header, process_table, statusbar};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn mock_system() -> MockFs {
    let mut fs = MockFs::new();
    fs.add_file("/etc/os-release", "NAME=Test\nPRETTY_NAME=\"Test Linux 1.0\"\n");
    fs.add_file("/proc/version", "Linux version 6.1.0-test (gcc) #1 SMP\n");
    fs.add_file("/proc/uptime", "3725.42 100.00\n");
    fs.add_file("/proc/meminfo", "MemTotal: 1000 kB\nMemFree: 250 kB\n");
    fs.add_file(
        "/proc/stat",
        "cpu 100 0 100 800 0 0 0 0 0 0\nprocesses 42\nprocs_running 2\n",
    );
    fs.add_file("/etc/passwd", "root:x:0:0:root:/root:/bin/sh\nalice:x:1000:1000::/home/alice:/bin/sh\n");
    fs.add_process(
        "/proc",
        1,
        "1 (init) S 0 1 1 0 -1 0 0 0 0 0 10 10 0 0 20 0 1 0 100 0 0",
        "Name:\tinit\nUid:\t0\t0\t0\t0\nVmSize:\t204800 kB\n",
        b"/sbin/init\0",
    );
    fs.add_process(
        "/proc",
        7,
        "7 (editor) R 1 7 7 0 -1 0 0 0 0 0 60 40 0 0 20 0 1 0 200 0 0",
        "Name:\teditor\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t51200 kB\n",
        b"vim\0notes.txt\0",
    );
    fs
}

fn mock_collector() -> Collector {
    Collector::with_filesystem(Arc::new(mock_system()), ProcPaths::default(), CpuMode::Delta)
}

#[test]
fn header_shows_system_summary() {
    let snapshot = SystemSnapshot {
        os_name: "Test Linux 1.0".to_string(),
        kernel: "6.1.0-test".to_string(),
        uptime_seconds: 3725,
        cpu_utilization: 0.25,
        memory_utilization: 0.75,
        total_processes: 42,
        running_processes: 2,
        processes: Vec::new(),
    };
    let theme = Theme::dark();
    let output = render_to_string(120, 4, |frame| {
        header::render(frame, frame.area(), &snapshot, CpuMode::Delta, &theme);
    });

    assert!(output.contains("Test Linux 1.0"));
    assert!(output.contains("6.1.0-test"));
    assert!(output.contains("Procs 42"));
    assert!(output.contains("Running 2"));
    assert!(output.contains("01:02:05"));
    assert!(output.contains("CPU (delta)"));
    assert!(output.contains("25.0%"));
    assert!(output.contains("75.0%"));
}

#[test]
fn process_table_lists_sorted_rows() {
    let mut collector = mock_collector();
    let snapshot = collector.refresh();
    let theme = Theme::dark();
    let output = render_to_string(100, 8, |frame| {
        process_table::render(frame, frame.area(), &snapshot.processes, 0, &theme);
    });

    assert!(output.contains("PID"));
    assert!(output.contains("COMMAND"));
    assert!(output.contains("Processes 1-2 of 2"));

    let lines: Vec<&str> = output.lines().collect();
    let editor_row = lines.iter().position(|l| l.contains("vim notes.txt"));
    let init_row = lines.iter().position(|l| l.contains("/sbin/init"));
    assert!(editor_row.is_some() && init_row.is_some());
    assert!(editor_row < init_row, "busiest process first:\n{output}");

    let editor_line = lines[editor_row.unwrap()];
    assert!(editor_line.contains("alice"));
    assert!(editor_line.contains("50"));
}

#[test]
fn process_table_honours_scroll_offset() {
    let mut collector = mock_collector();
    let snapshot = collector.refresh();
    let theme = Theme::dark();
    let output = render_to_string(100, 8, |frame| {
        process_table::render(frame, frame.area(), &snapshot.processes, 1, &theme);
    });

    assert!(output.contains("Processes 2-2 of 2"));
    assert!(!output.contains("vim notes.txt"));
    assert!(output.contains("/sbin/init"));
}

#[test]
fn process_table_empty_list() {
    let theme = Theme::dark();
    let output = render_to_string(80, 6, |frame| {
        process_table::render(frame, frame.area(), &[], 0, &theme);
    });
    assert!(output.contains("Processes 0-0 of 0"));
}

#[test]
fn visible_rows_excludes_borders_and_header() {
    assert_eq!(process_table::visible_rows(ratatui::layout::Rect::new(0, 0, 80, 20)), 17);
    assert_eq!(process_table::visible_rows(ratatui::layout::Rect::new(0, 0, 80, 2)), 0);
}

#[test]
fn statusbar_shows_keybind_pills() {
    let keybinds = ResolvedKeybinds::from_config(&KeybindsConfig::default());
    let theme = Theme::dark();
    let output = render_to_string(100, 1, |frame| {
        statusbar::render(frame, frame.area(), &keybinds, None, &theme);
    });

    assert!(output.contains(" q  Quit"));
    assert!(output.contains(" r  Refresh"));
    assert!(output.contains(" c  CPU mode"));
    assert!(output.contains(" ?  Help"));
}

#[test]
fn statusbar_prefers_status_message() {
    let keybinds = ResolvedKeybinds::from_config(&KeybindsConfig::default());
    let theme = Theme::dark();
    let message = ("CPU mode: cumulative".to_string(), Instant::now());
    let output = render_to_string(100, 1, |frame| {
        statusbar::render(frame, frame.area(), &keybinds, Some(&message), &theme);
    });

    assert!(output.contains("CPU mode: cumulative"));
    assert!(!output.contains("Quit"));
}

#[test]
fn full_draw_sets_visible_rows_and_shows_help() {
    let mut app = App::with_collector(mock_collector(), &Config::default());
    app.dispatch(crate::action::Action::ToggleHelp);

    let backend = TestBackend::new(100, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| super::draw(frame, &mut app)).unwrap();
    let output = buffer_to_string(terminal.backend().buffer());

    // 24 rows: header 4, statusbar 1, table borders and header 3
    assert_eq!(app.visible_rows, 16);
    assert!(output.contains("Keys"));
    assert!(output.contains("Cycle CPU mode"));
    assert!(output.contains("change since last refresh"));
}

#[test]
fn header_names_the_formula_actually_used() {
    let mut app = App::with_collector(mock_collector(), &Config::default());

    let backend = TestBackend::new(120, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| super::draw(frame, &mut app)).unwrap();
    let first = buffer_to_string(terminal.backend().buffer());
    assert!(first.contains("CPU (cumulative)"));

    app.refresh_data();
    terminal.draw(|frame| super::draw(frame, &mut app)).unwrap();
    let second = buffer_to_string(terminal.backend().buffer());
    assert!(second.contains("CPU (delta)"));
}
