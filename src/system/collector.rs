use std::sync::Arc;

use super::cpu::{CpuMode, Processor};
use super::fs::{FileSystem, RealFs};
use super::process::{ProcessSnapshot, sort_by_cpu};
use super::reader::{ProcPaths, ProcReader};
use super::snapshot::SystemSnapshot;

/// Runs refresh cycles and exposes system-wide aggregates.
///
/// The only state kept between cycles is the previous process collection,
/// which each refresh replaces wholesale, and the previous CPU sample used by
/// [`CpuMode::Delta`].
#[derive(Debug)]
pub struct Collector {
    reader: Arc<ProcReader>,
    processor: Processor,
    processes: Vec<ProcessSnapshot>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(ProcPaths::default(), CpuMode::default())
    }
}

impl Collector {
    /// Collector over the host filesystem.
    pub fn new(paths: ProcPaths, mode: CpuMode) -> Self {
        Self::with_filesystem(Arc::new(RealFs::new()), paths, mode)
    }

    pub fn with_filesystem(fs: Arc<dyn FileSystem>, paths: ProcPaths, mode: CpuMode) -> Self {
        Self::with_reader(ProcReader::new(fs, paths), mode)
    }

    pub fn with_reader(reader: ProcReader, mode: CpuMode) -> Self {
        Collector {
            reader: Arc::new(reader),
            processor: Processor::new(mode),
            processes: Vec::new(),
        }
    }

    pub fn reader(&self) -> &ProcReader {
        &self.reader
    }

    pub fn cpu_mode(&self) -> CpuMode {
        self.processor.mode()
    }

    pub fn set_cpu_mode(&mut self, mode: CpuMode) {
        self.processor.set_mode(mode);
    }

    /// Formula behind the last CPU value. Differs from [`cpu_mode`](Self::cpu_mode)
    /// when delta mode had no earlier sample to diff against.
    pub fn cpu_formula(&self) -> CpuMode {
        self.processor.last_formula()
    }

    /// Enumerates live pids, replaces the previous collection and sorts it by
    /// CPU utilization, highest first.
    pub fn refresh_processes(&mut self) -> &[ProcessSnapshot] {
        let pids = self.reader.pids();
        let mut processes: Vec<ProcessSnapshot> = pids
            .into_iter()
            .map(|pid| ProcessSnapshot::new(pid, Arc::clone(&self.reader)))
            .collect();

        {
            #[cfg(feature = "perf-tracing")]
            let _sort_span = tracing::debug_span!("collector.sort", count = processes.len()).entered();
            sort_by_cpu(&mut processes);
        }

        self.processes = processes;
        &self.processes
    }

    /// Full refresh: the process collection plus every aggregate, re-read.
    pub fn refresh(&mut self) -> SystemSnapshot {
        #[cfg(feature = "perf-tracing")]
        let _refresh_span = tracing::debug_span!("collector.refresh").entered();

        let processes = self.refresh_processes().to_vec();
        SystemSnapshot {
            os_name: self.operating_system(),
            kernel: self.kernel(),
            uptime_seconds: self.uptime(),
            cpu_utilization: self.cpu_utilization(),
            memory_utilization: self.memory_utilization(),
            total_processes: self.total_processes(),
            running_processes: self.running_processes(),
            processes,
        }
    }

    /// The collection built by the last refresh.
    pub fn processes(&self) -> &[ProcessSnapshot] {
        &self.processes
    }

    pub fn operating_system(&self) -> String {
        self.reader.operating_system()
    }

    pub fn kernel(&self) -> String {
        self.reader.kernel()
    }

    pub fn uptime(&self) -> u64 {
        self.reader.uptime()
    }

    /// System-wide utilization in `[0, 1]` under the current [`CpuMode`].
    ///
    /// In delta mode every call advances the stored sample, so the value is
    /// relative to the previous call.
    pub fn cpu_utilization(&mut self) -> f32 {
        let ticks = self.reader.cpu_ticks();
        self.processor.utilization(ticks)
    }

    pub fn memory_utilization(&self) -> f32 {
        self.reader.memory_utilization()
    }

    pub fn total_processes(&self) -> u64 {
        self.reader.total_processes()
    }

    pub fn running_processes(&self) -> u64 {
        self.reader.running_processes()
    }
}
