//! CPU rate calculation from cumulative jiffy counters.

/// The first 8 counters of the aggregate `cpu` line, in kernel order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTicks {
    /// Sum of all 8 counters, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.active().saturating_add(self.idle_total())
    }

    /// Non-idle time: everything except `idle` and `iowait`.
    pub fn active(&self) -> u64 {
        [self.nice, self.system, self.irq, self.softirq, self.steal]
            .into_iter()
            .fold(self.user, u64::saturating_add)
    }

    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }
}

/// How system-wide utilization is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuMode {
    /// `Δactive / Δtotal` between consecutive samples.
    #[default]
    Delta,
    /// `active / total` of the since-boot counters. Converges to the average
    /// over the whole uptime and hides short spikes; kept for compatibility.
    Cumulative,
}

impl CpuMode {
    pub fn next(self) -> Self {
        match self {
            CpuMode::Delta => CpuMode::Cumulative,
            CpuMode::Cumulative => CpuMode::Delta,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CpuMode::Delta => "delta",
            CpuMode::Cumulative => "cumulative",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cumulative" | "since-boot" => CpuMode::Cumulative,
            _ => CpuMode::Delta,
        }
    }
}

fn ratio(active: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (active as f64 / total as f64) as f32
}

/// System-wide utilization tracker. Holds only the previous sample.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    mode: CpuMode,
    previous: Option<CpuTicks>,
    /// Formula behind the most recent value.
    last_formula: CpuMode,
}

impl Processor {
    pub fn new(mode: CpuMode) -> Self {
        Self {
            mode,
            previous: None,
            last_formula: mode,
        }
    }

    /// Which formula produced the last [`utilization`](Self::utilization)
    /// value. A delta-mode fallback reports [`CpuMode::Cumulative`].
    pub fn last_formula(&self) -> CpuMode {
        self.last_formula
    }

    pub fn mode(&self) -> CpuMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CpuMode) {
        self.mode = mode;
    }

    /// Utilization in `[0, 1]` for a fresh sample.
    ///
    /// In delta mode the first sample has nothing to diff against and falls
    /// back to the cumulative ratio. Counters that went backwards (a reset,
    /// or a zeroed default after a failed read) also fall back.
    pub fn utilization(&mut self, current: CpuTicks) -> f32 {
        let previous = self.previous.replace(current);
        let delta = match (self.mode, previous) {
            (CpuMode::Delta, Some(prev)) => current
                .active()
                .checked_sub(prev.active())
                .zip(current.total().checked_sub(prev.total())),
            _ => None,
        };
        match delta {
            Some((d_active, d_total)) => {
                self.last_formula = CpuMode::Delta;
                ratio(d_active, d_total).min(1.0)
            }
            None => {
                self.last_formula = CpuMode::Cumulative;
                ratio(current.active(), current.total())
            }
        }
    }
}

/// Per-process CPU percentage: process active jiffies over system-wide
/// active jiffies, times 100.
///
/// The numerator counts since the process started and the denominator since
/// boot, so the value only ranks processes sampled at the same instant; it
/// does not sum to 100 across processes. A zero denominator yields 0.0.
pub fn process_cpu_percent(process_active: u64, system_active: u64) -> f32 {
    ratio(process_active, system_active) * 100.0
}
