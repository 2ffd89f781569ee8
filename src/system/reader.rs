//! Counter reader: one kernel source per call, parsed and defaulted.
//!
//! Each accessor opens its source, parses it with the grammar from
//! [`parser`](super::parser) and returns a typed value. Nothing is cached
//! between calls. The plain accessors never fail: a missing source, a
//! malformed record or a process that exited mid-read all degrade to the
//! documented zero/empty default. The `try_*` variants expose the failure as a
//! [`SourceError`] for callers that want to tell those cases apart.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cpu::{CpuTicks, process_cpu_percent};
use super::fs::{FileSystem, RealFs};
use super::parser::{self, MemInfo, ParseError, ProcStat};
use super::platform;
use super::process::Pid;

/// Where the sampled sources live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcPaths {
    pub proc_root: PathBuf,
    pub os_release: PathBuf,
    pub passwd: PathBuf,
}

impl Default for ProcPaths {
    fn default() -> Self {
        ProcPaths {
            proc_root: PathBuf::from("/proc"),
            os_release: PathBuf::from("/etc/os-release"),
            passwd: PathBuf::from("/etc/passwd"),
        }
    }
}

impl ProcPaths {
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        ProcPaths {
            proc_root: proc_root.into(),
            ..ProcPaths::default()
        }
    }

    fn global(&self, name: &str) -> PathBuf {
        self.proc_root.join(name)
    }

    fn process(&self, pid: Pid, name: &str) -> PathBuf {
        self.proc_root.join(pid.to_string()).join(name)
    }
}

/// Why a source could not produce a value.
#[derive(Debug)]
pub enum SourceError {
    /// The file or directory is missing or unreadable.
    Unavailable { path: PathBuf, source: io::Error },
    /// A per-process source disappeared: the process exited after enumeration.
    Transient { pid: Pid, path: PathBuf },
    /// The source was read but does not follow its grammar.
    Malformed { path: PathBuf, error: ParseError },
}

impl SourceError {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Unavailable { .. } => "unavailable",
            SourceError::Transient { .. } => "transient",
            SourceError::Malformed { .. } => "malformed",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceError::Unavailable { path, .. }
            | SourceError::Transient { path, .. }
            | SourceError::Malformed { path, .. } => path,
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable { path, source } => {
                write!(f, "{} unavailable: {source}", path.display())
            }
            SourceError::Transient { pid, path } => {
                write!(f, "process {pid} exited before {} was read", path.display())
            }
            SourceError::Malformed { path, error } => {
                write!(f, "{} malformed: {error}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Unavailable { source, .. } => Some(source),
            SourceError::Malformed { error, .. } => Some(error),
            SourceError::Transient { .. } => None,
        }
    }
}

pub struct ProcReader {
    fs: Arc<dyn FileSystem>,
    paths: ProcPaths,
    clock_ticks: u64,
}

impl fmt::Debug for ProcReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcReader")
            .field("paths", &self.paths)
            .field("clock_ticks", &self.clock_ticks)
            .finish_non_exhaustive()
    }
}

impl Default for ProcReader {
    fn default() -> Self {
        Self::new(Arc::new(RealFs::new()), ProcPaths::default())
    }
}

impl ProcReader {
    pub fn new(fs: Arc<dyn FileSystem>, paths: ProcPaths) -> Self {
        Self {
            fs,
            paths,
            clock_ticks: platform::clock_ticks_per_second(),
        }
    }

    /// Overrides the jiffies-per-second rate used for process run time.
    pub fn with_clock_ticks(mut self, ticks: u64) -> Self {
        self.clock_ticks = ticks.max(1);
        self
    }

    pub fn paths(&self) -> &ProcPaths {
        &self.paths
    }

    pub fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    fn read(&self, path: PathBuf) -> Result<(String, PathBuf), SourceError> {
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok((content, path)),
            Err(source) => Err(SourceError::Unavailable { path, source }),
        }
    }

    fn read_process(&self, pid: Pid, name: &str) -> Result<(String, PathBuf), SourceError> {
        let path = self.paths.process(pid, name);
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok((content, path)),
            Err(e) => Err(process_read_error(pid, path, e)),
        }
    }

    fn parse_global<T>(
        &self,
        name: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, SourceError> {
        let (content, path) = self.read(self.paths.global(name))?;
        parse(&content).map_err(|error| SourceError::Malformed { path, error })
    }

    fn parse_process<T>(
        &self,
        pid: Pid,
        name: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, SourceError> {
        let (content, path) = self.read_process(pid, name)?;
        parse(&content).map_err(|error| SourceError::Malformed { path, error })
    }

    pub fn try_operating_system(&self) -> Result<String, SourceError> {
        let (content, path) = self.read(self.paths.os_release.clone())?;
        parser::parse_os_pretty_name(&content).ok_or_else(|| SourceError::Malformed {
            path,
            error: ParseError::new("missing PRETTY_NAME"),
        })
    }

    /// OS pretty name; `""` when unavailable.
    pub fn operating_system(&self) -> String {
        degrade(self.try_operating_system())
    }

    pub fn try_kernel(&self) -> Result<String, SourceError> {
        self.parse_global("version", |content| {
            parser::parse_kernel_release(content)
                .ok_or_else(|| ParseError::new("version line has fewer than 3 tokens"))
        })
    }

    /// Kernel release; `""` when unavailable.
    pub fn kernel(&self) -> String {
        degrade(self.try_kernel())
    }

    pub fn try_pids(&self) -> Result<Vec<Pid>, SourceError> {
        let root = &self.paths.proc_root;
        let entries = self
            .fs
            .read_dir(root)
            .map_err(|source| SourceError::Unavailable {
                path: root.clone(),
                source,
            })?;

        let mut pids: Vec<Pid> = entries
            .iter()
            .filter(|path| self.fs.is_dir(path))
            .filter_map(|path| path.file_name()?.to_str())
            .filter(|name| parser::is_pid_name(name))
            .filter_map(|name| name.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    /// Live process ids, ascending; empty when the proc root is unreadable.
    pub fn pids(&self) -> Vec<Pid> {
        degrade(self.try_pids())
    }

    pub fn try_meminfo(&self) -> Result<MemInfo, SourceError> {
        self.parse_global("meminfo", parser::parse_meminfo)
    }

    /// `(MemTotal - MemFree) / MemTotal`; 0.0 when either is missing or total is 0.
    pub fn memory_utilization(&self) -> f32 {
        degrade(self.try_meminfo()).utilization()
    }

    pub fn try_uptime(&self) -> Result<u64, SourceError> {
        self.parse_global("uptime", parser::parse_uptime)
    }

    /// Seconds since boot; 0 when unavailable.
    pub fn uptime(&self) -> u64 {
        degrade(self.try_uptime())
    }

    pub fn try_cpu_ticks(&self) -> Result<CpuTicks, SourceError> {
        self.parse_global("stat", parser::parse_cpu_ticks)
    }

    /// Aggregate CPU counters; all zero when unavailable.
    pub fn cpu_ticks(&self) -> CpuTicks {
        degrade(self.try_cpu_ticks())
    }

    /// Sum of the 8 CPU counters.
    pub fn jiffies(&self) -> u64 {
        self.cpu_ticks().total()
    }

    /// System-wide non-idle jiffies (idle and iowait excluded).
    pub fn active_jiffies(&self) -> u64 {
        self.cpu_ticks().active()
    }

    /// System-wide `idle + iowait`.
    pub fn idle_jiffies(&self) -> u64 {
        self.cpu_ticks().idle_total()
    }

    pub fn try_total_processes(&self) -> Result<u64, SourceError> {
        self.parse_global("stat", |c| parser::parse_stat_counter(c, "processes"))
    }

    /// Processes forked since boot (`processes` line).
    pub fn total_processes(&self) -> u64 {
        degrade(self.try_total_processes())
    }

    pub fn try_running_processes(&self) -> Result<u64, SourceError> {
        self.parse_global("stat", |c| parser::parse_stat_counter(c, "procs_running"))
    }

    pub fn running_processes(&self) -> u64 {
        degrade(self.try_running_processes())
    }

    pub fn try_process_stat(&self, pid: Pid) -> Result<ProcStat, SourceError> {
        self.parse_process(pid, "stat", parser::parse_proc_stat)
    }

    /// `utime + stime + cutime + cstime`; 0 when the stat record is missing.
    pub fn process_active_jiffies(&self, pid: Pid) -> u64 {
        self.try_process_stat(pid)
            .map(|stat| stat.active_jiffies())
            .unwrap_or_else(|e| {
                trace_degraded(&e);
                0
            })
    }

    /// One-letter scheduler state; `'?'` when unavailable.
    pub fn process_state(&self, pid: Pid) -> char {
        self.try_process_stat(pid)
            .map(|stat| stat.state)
            .unwrap_or_else(|e| {
                trace_degraded(&e);
                '?'
            })
    }

    /// Relative CPU share of `pid`, in percent.
    pub fn process_cpu_utilization(&self, pid: Pid) -> f32 {
        process_cpu_percent(self.process_active_jiffies(pid), self.active_jiffies())
    }

    pub fn try_command(&self, pid: Pid) -> Result<String, SourceError> {
        let path = self.paths.process(pid, "cmdline");
        match self.fs.read_bytes(&path) {
            Ok(bytes) => Ok(parser::parse_cmdline(&bytes)),
            Err(e) => Err(process_read_error(pid, path, e)),
        }
    }

    /// Command line with NUL separators replaced by spaces; `""` when unavailable.
    pub fn command(&self, pid: Pid) -> String {
        degrade(self.try_command(pid))
    }

    pub fn try_vm_size_kb(&self, pid: Pid) -> Result<u64, SourceError> {
        self.parse_process(pid, "status", parser::parse_vm_size_kb)
    }

    /// `VmSize` in whole megabytes; 0 when unavailable (kernel threads have none).
    pub fn ram_mb(&self, pid: Pid) -> u64 {
        degrade(self.try_vm_size_kb(pid)) / 1024
    }

    /// [`ram_mb`](Self::ram_mb) as a display string; `"0"` when unavailable.
    pub fn ram(&self, pid: Pid) -> String {
        self.ram_mb(pid).to_string()
    }

    pub fn try_uid(&self, pid: Pid) -> Result<u32, SourceError> {
        self.parse_process(pid, "status", parser::parse_uid)
    }

    pub fn uid(&self, pid: Pid) -> Option<u32> {
        self.try_uid(pid)
            .map_err(|e| trace_degraded(&e))
            .ok()
    }

    pub fn try_user(&self, pid: Pid) -> Result<String, SourceError> {
        let uid = self.try_uid(pid)?;
        let (content, path) = self.read(self.paths.passwd.clone())?;
        parser::parse_passwd_name(&content, uid).ok_or_else(|| SourceError::Malformed {
            path,
            error: ParseError::new(format!("no entry for uid {uid}")),
        })
    }

    /// Owning user name; `""` when the uid or its passwd entry is missing.
    pub fn user(&self, pid: Pid) -> String {
        degrade(self.try_user(pid))
    }

    pub fn try_process_uptime(&self, pid: Pid) -> Result<u64, SourceError> {
        let (content, path) = self.read_process(pid, "stat")?;
        let stat = parser::parse_proc_stat(&content).map_err(|error| SourceError::Malformed {
            path: path.clone(),
            error,
        })?;
        let start_ticks = stat.starttime.ok_or_else(|| SourceError::Malformed {
            path,
            error: ParseError::new("stat record has no usable starttime (field 22)"),
        })?;
        Ok(self.uptime().saturating_sub(start_ticks / self.clock_ticks))
    }

    /// Seconds since the process started; 0 when its stat record is short or missing.
    pub fn process_uptime(&self, pid: Pid) -> u64 {
        degrade(self.try_process_uptime(pid))
    }
}

fn process_read_error(pid: Pid, path: PathBuf, e: io::Error) -> SourceError {
    if e.kind() == io::ErrorKind::NotFound {
        SourceError::Transient { pid, path }
    } else {
        SourceError::Unavailable { path, source: e }
    }
}

fn degrade<T: Default>(result: Result<T, SourceError>) -> T {
    result.unwrap_or_else(|e| {
        trace_degraded(&e);
        T::default()
    })
}

#[cfg(feature = "perf-tracing")]
fn trace_degraded(e: &SourceError) {
    tracing::trace!(kind = e.kind(), path = %e.path().display(), error = %e, "source degraded to default");
}

#[cfg(not(feature = "perf-tracing"))]
fn trace_degraded(_e: &SourceError) {}
