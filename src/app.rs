use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, parse_key};
use crate::system::collector::Collector;
use crate::system::cpu::CpuMode;
use crate::system::snapshot::SystemSnapshot;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub help: KeyCode,
    pub refresh: KeyCode,
    pub cycle_cpu_mode: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            cycle_cpu_mode: parse_key(&kb.cycle_cpu_mode).unwrap_or(KeyCode::Char('c')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.help), "Toggle help"),
            (key_label(self.refresh), "Refresh now"),
            (key_label(self.cycle_cpu_mode), "Cycle CPU mode"),
        ];
        entries.push(("↑↓".to_string(), "Scroll"));
        entries.push(("PgUp/PgDn".to_string(), "Scroll page"));
        entries.push(("Home/End".to_string(), "Top / bottom"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub collector: Collector,
    pub snapshot: SystemSnapshot,
    /// Index of the first table row on screen.
    pub scroll: usize,
    /// Table rows that fit on screen; set by the renderer each frame.
    pub visible_rows: usize,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
    pub keybinds: ResolvedKeybinds,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mode = CpuMode::from_str_config(&config.general.cpu_mode);
        let collector = Collector::new(config.paths.to_proc_paths(), mode);
        Self::with_collector(collector, &config)
    }

    pub fn with_collector(mut collector: Collector, config: &Config) -> Self {
        let snapshot = collector.refresh();
        App {
            running: true,
            collector,
            snapshot,
            scroll: 0,
            visible_rows: 0,
            input_mode: InputMode::Normal,
            theme: Theme::from_config(&config.colors.theme),
            status_message: None,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        }
    }

    pub fn refresh_data(&mut self) {
        self.snapshot = self.collector.refresh();
        self.clamp_scroll();

        // Clear expired status messages (older than 3 seconds)
        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= 3
        {
            self.status_message = None;
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Navigation keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Scroll(Direction::Up),
            KeyCode::Down => return Action::Scroll(Direction::Down),
            KeyCode::PageUp => return Action::Scroll(Direction::PageUp),
            KeyCode::PageDown => return Action::Scroll(Direction::PageDown),
            KeyCode::Home => return Action::Scroll(Direction::Top),
            KeyCode::End => return Action::Scroll(Direction::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.cycle_cpu_mode {
            return Action::CycleCpuMode;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Scroll(direction) => self.scroll_by(direction),
            Action::CycleCpuMode => {
                let mode = self.collector.cpu_mode().next();
                self.collector.set_cpu_mode(mode);
                self.status_message = Some((format!("CPU mode: {}", mode.label()), Instant::now()));
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::Refresh => self.refresh_data(),
            Action::None => {}
        }
    }

    fn max_scroll(&self) -> usize {
        self.snapshot
            .processes
            .len()
            .saturating_sub(self.visible_rows.max(1))
    }

    fn scroll_by(&mut self, direction: Direction) {
        let page = self.visible_rows.max(1);
        self.scroll = match direction {
            Direction::Up => self.scroll.saturating_sub(1),
            Direction::Down => self.scroll + 1,
            Direction::PageUp => self.scroll.saturating_sub(page),
            Direction::PageDown => self.scroll + page,
            Direction::Top => 0,
            Direction::Bottom => self.max_scroll(),
        };
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}
