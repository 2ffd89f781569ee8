use std::cmp::Ordering;
use std::sync::Arc;

use super::cpu::process_cpu_percent;
use super::reader::ProcReader;

pub type Pid = u32;

/// One observed process at one refresh.
///
/// Holds only the pid; every attribute is re-read through the reader on each
/// call, so two reads of the same snapshot can differ if time has passed. A pid
/// that survives several refreshes gets an unrelated snapshot each time.
#[derive(Clone)]
pub struct ProcessSnapshot {
    pid: Pid,
    reader: Arc<ProcReader>,
}

impl std::fmt::Debug for ProcessSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSnapshot").field("pid", &self.pid).finish()
    }
}

impl ProcessSnapshot {
    pub fn new(pid: Pid, reader: Arc<ProcReader>) -> Self {
        Self { pid, reader }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn user(&self) -> String {
        self.reader.user(self.pid)
    }

    pub fn command(&self) -> String {
        self.reader.command(self.pid)
    }

    /// Percent of system-wide active jiffies; see [`process_cpu_percent`].
    pub fn cpu_utilization(&self) -> f32 {
        self.reader.process_cpu_utilization(self.pid)
    }

    /// Megabytes as a string, `"0"` when unknown.
    pub fn ram(&self) -> String {
        self.reader.ram(self.pid)
    }

    pub fn ram_mb(&self) -> u64 {
        self.reader.ram_mb(self.pid)
    }

    /// Seconds since the process started.
    pub fn uptime(&self) -> u64 {
        self.reader.process_uptime(self.pid)
    }

    pub fn state(&self) -> char {
        self.reader.process_state(self.pid)
    }

    /// Orders by CPU utilization, highest first. Ties compare equal.
    pub fn cmp_by_cpu(&self, other: &Self) -> Ordering {
        other.cpu_utilization().total_cmp(&self.cpu_utilization())
    }
}

/// Sorts by CPU utilization, highest first; ties keep their current order.
///
/// Each process's utilization is read once per sort against a single reading
/// of the system-wide denominator, so the comparison sees one consistent
/// instant instead of re-reading `/proc` on every comparison.
pub fn sort_by_cpu(processes: &mut [ProcessSnapshot]) {
    let Some(reader) = processes.first().map(|p| Arc::clone(&p.reader)) else {
        return;
    };
    let system_active = reader.active_jiffies();

    let mut keyed: Vec<(f32, ProcessSnapshot)> = processes
        .iter()
        .map(|p| {
            let cpu = process_cpu_percent(p.reader.process_active_jiffies(p.pid), system_active);
            (cpu, p.clone())
        })
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (slot, (_, p)) in processes.iter_mut().zip(keyed) {
        *slot = p;
    }
}
