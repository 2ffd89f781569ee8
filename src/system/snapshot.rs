use super::process::ProcessSnapshot;

/// Machine state as of one refresh. Rebuilt from scratch every cycle.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    pub os_name: String,
    pub kernel: String,
    pub uptime_seconds: u64,
    /// Fraction in `[0, 1]`.
    pub cpu_utilization: f32,
    /// Fraction in `[0, 1]`.
    pub memory_utilization: f32,
    pub total_processes: u64,
    pub running_processes: u64,
    /// Sorted by CPU utilization, highest first.
    pub processes: Vec<ProcessSnapshot>,
}
