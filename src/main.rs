use std::io::{Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
#[cfg(not(feature = "perf-tracing"))]
use color_eyre::eyre::eyre;
use crossterm::event::KeyEventKind;

use proctop::app::App;
use proctop::config::{self, load_config, load_config_from_path};
use proctop::event::{Event, EventHandler};
use proctop::format::{elapsed_time, format_percent};
use proctop::system::collector::Collector;
use proctop::system::cpu::CpuMode;
use proctop::system::snapshot::SystemSnapshot;
use proctop::ui;

#[derive(Parser)]
#[command(
    name = "proctop",
    about = "Terminal process monitor backed by /proc"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// System CPU measure: delta or cumulative
    #[arg(long, value_parser = ["delta", "cumulative"])]
    cpu_mode: Option<String>,

    /// Root of the proc filesystem
    #[arg(long)]
    proc_root: Option<PathBuf>,

    /// Print one sample as plain text and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Write tracing spans to this file as JSON lines (needs `perf-tracing`).
    #[arg(long)]
    trace_output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if let Some(path) = &cli.trace_output {
        init_tracing(path)?;
    }

    if cli.once {
        return print_once(config).await;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: config::Config) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms.max(1));
    let mut app = App::new(config);
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = app.map_key(key);
                app.dispatch(action);
                true
            }
            Event::Key(_) => false,
            Event::Tick => {
                app.refresh_data();
                true
            }
            Event::Resize => true,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
        }
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref mode) = cli.cpu_mode {
        config.general.cpu_mode = mode.clone();
    }
    if let Some(ref root) = cli.proc_root {
        config.paths.proc_root = root.clone();
    }

    config
}

async fn print_once(config: config::Config) -> Result<()> {
    let mode = CpuMode::from_str_config(&config.general.cpu_mode);
    let mut collector = Collector::new(config.paths.to_proc_paths(), mode);
    let interval = Duration::from_millis(config.general.refresh_rate_ms.max(1));
    let snapshot = sample_once(&mut collector, interval).await;

    let mut out = stdout().lock();
    write_snapshot(&mut out, &snapshot, collector.cpu_formula())?;
    out.flush()?;
    Ok(())
}

/// One snapshot for `--once`. Delta mode needs a baseline, so it samples
/// twice, `interval` apart.
async fn sample_once(collector: &mut Collector, interval: Duration) -> SystemSnapshot {
    let snapshot = collector.refresh();
    if collector.cpu_mode() != CpuMode::Delta {
        return snapshot;
    }
    tokio::time::sleep(interval).await;
    collector.refresh()
}

fn write_snapshot(out: &mut impl Write, snapshot: &SystemSnapshot, mode: CpuMode) -> Result<()> {
    writeln!(out, "OS: {}  Kernel: {}", snapshot.os_name, snapshot.kernel)?;
    writeln!(
        out,
        "Up: {}  Procs: {}  Running: {}",
        elapsed_time(snapshot.uptime_seconds),
        snapshot.total_processes,
        snapshot.running_processes
    )?;
    writeln!(
        out,
        "CPU ({}): {}  Memory: {}",
        mode.label(),
        format_percent(snapshot.cpu_utilization),
        format_percent(snapshot.memory_utilization)
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:>7} {:<10} {:>6} {:>8} {:>10} COMMAND",
        "PID", "USER", "CPU%", "RAM[MB]", "TIME+"
    )?;
    for process in &snapshot.processes {
        writeln!(
            out,
            "{:>7} {:<10} {:>6.1} {:>8} {:>10} {}",
            process.pid(),
            process.user(),
            process.cpu_utilization(),
            process.ram(),
            elapsed_time(process.uptime()),
            process.command().trim_end()
        )?;
    }
    Ok(())
}

fn init_tracing(path: &std::path::Path) -> Result<()> {
    #[cfg(not(feature = "perf-tracing"))]
    {
        let _ = path;
        Err(eyre!(
            "--trace-output requires the `perf-tracing` feature; run with `cargo run --features perf-tracing -- --trace-output <FILE>`"
        ))
    }

    #[cfg(feature = "perf-tracing")]
    {
        proctop::perf::init_tracing_json(path)
    }
}
