//! Parsers for the kernel's text sources.
//!
//! Pure functions from file content to typed values, so every grammar can be
//! tested with string literals. Defaulting happens one layer up, in
//! [`crate::system::reader`].

use super::cpu::CpuTicks;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// `PRETTY_NAME` from an os-release file, with surrounding quotes removed.
pub fn parse_os_pretty_name(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != "PRETTY_NAME" {
            return None;
        }
        Some(value.trim().trim_matches(['"', '\'']).to_string())
    })
}

/// Kernel release from `/proc/version`: `Linux version <release> ...`.
pub fn parse_kernel_release(content: &str) -> Option<String> {
    let line = content.lines().next()?;
    line.split_whitespace().nth(2).map(str::to_string)
}

/// True for directory names made only of ASCII digits.
pub fn is_pid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub free_kb: u64,
}

impl MemInfo {
    /// `(total - free) / total`; 0.0 when total is zero.
    pub fn utilization(&self) -> f32 {
        if self.total_kb == 0 {
            return 0.0;
        }
        self.total_kb.saturating_sub(self.free_kb) as f32 / self.total_kb as f32
    }
}

/// `MemTotal` and `MemFree` from `/proc/meminfo`. Both must be present.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut total = None;
    let mut free = None;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let slot = match key.trim_end_matches(':') {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            _ => continue,
        };
        *slot = Some(
            value
                .parse::<u64>()
                .map_err(|_| ParseError::new(format!("invalid {key} value `{value}`")))?,
        );
        if total.is_some() && free.is_some() {
            break;
        }
    }

    Ok(MemInfo {
        total_kb: total.ok_or_else(|| ParseError::new("missing MemTotal"))?,
        free_kb: free.ok_or_else(|| ParseError::new("missing MemFree"))?,
    })
}

/// Whole seconds since boot from `/proc/uptime` (fraction truncated).
pub fn parse_uptime(content: &str) -> Result<u64, ParseError> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?;
    let seconds: f64 = first
        .parse()
        .map_err(|_| ParseError::new(format!("invalid uptime `{first}`")))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ParseError::new(format!("invalid uptime `{first}`")));
    }
    Ok(seconds as u64)
}

/// The aggregate `cpu ` line of `/proc/stat`.
///
/// Scans until the first line tagged exactly `cpu` (per-core `cpuN` lines are
/// skipped) and stops there. Consumes the first 8 counters; guest and
/// guest_nice are ignored. Counters missing from a short line read as zero.
pub fn parse_cpu_ticks(content: &str) -> Result<CpuTicks, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("no aggregate cpu line"))?;

    let mut values = [0u64; 8];
    let mut seen = 0;
    for (slot, field) in values.iter_mut().zip(line.split_whitespace().skip(1)) {
        *slot = field
            .parse()
            .map_err(|_| ParseError::new(format!("invalid cpu counter `{field}`")))?;
        seen += 1;
    }
    if seen == 0 {
        return Err(ParseError::new("cpu line has no counters"));
    }

    let [user, nice, system, idle, iowait, irq, softirq, steal] = values;
    Ok(CpuTicks {
        user,
        nice,
        system,
        idle,
        iowait,
        irq,
        softirq,
        steal,
    })
}

/// Value of a `key <n>` line in `/proc/stat`, e.g. `processes` or `procs_running`.
pub fn parse_stat_counter(content: &str, key: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some(key) {
            continue;
        }
        let value = parts
            .next()
            .ok_or_else(|| ParseError::new(format!("`{key}` has no value")))?;
        return value
            .parse()
            .map_err(|_| ParseError::new(format!("invalid `{key}` value `{value}`")));
    }
    Err(ParseError::new(format!("missing `{key}` line")))
}

/// Fields of `/proc/[pid]/stat` this monitor uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    pub utime: u64,
    pub stime: u64,
    pub cutime: i64,
    pub cstime: i64,
    /// Field 22, ticks after boot. `None` when the record is shorter or the
    /// field is not a number.
    pub starttime: Option<u64>,
}

impl ProcStat {
    /// `utime + stime + cutime + cstime`, floored at zero.
    pub fn active_jiffies(&self) -> u64 {
        let total = self.utime as i128 + self.stime as i128 + self.cutime as i128 + self.cstime as i128;
        total.clamp(0, u64::MAX as i128) as u64
    }
}

/// Splits a stat record into conventional 1-based fields (index 0 is `pid`,
/// index 1 is `(comm)`).
///
/// `comm` may contain spaces and parentheses, so the record is split around
/// the first `(` and the last `)`. Records without parentheses fall back to a
/// plain whitespace split.
pub fn stat_fields(content: &str) -> Vec<&str> {
    let content = content.trim();
    match (content.find('('), content.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            let mut fields = Vec::with_capacity(52);
            fields.push(content[..open].trim());
            fields.push(&content[open..=close]);
            fields.extend(content[close + 1..].split_whitespace());
            fields
        }
        _ => content.split_whitespace().collect(),
    }
}

/// Parses `/proc/[pid]/stat`. Requires at least the 17 fields through `cstime`.
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let fields = stat_fields(content);
    if fields.len() < 17 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 17+, got {}",
            fields.len()
        )));
    }

    let field = |n: usize| fields[n - 1];
    fn number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, ParseError> {
        raw.parse()
            .map_err(|_| ParseError::new(format!("invalid {name} `{raw}`")))
    }

    // Only run time depends on starttime; a bad value must not hide the CPU fields.
    let starttime = fields.get(21).and_then(|raw| raw.parse().ok());

    Ok(ProcStat {
        pid: number(field(1), "pid")?,
        comm: field(2)
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(field(2))
            .to_string(),
        state: field(3).chars().next().unwrap_or('?'),
        ppid: number(field(4), "ppid")?,
        utime: number(field(14), "utime")?,
        stime: number(field(15), "stime")?,
        cutime: number(field(16), "cutime")?,
        cstime: number(field(17), "cstime")?,
        starttime,
    })
}

/// First token after `key:` in a `/proc/[pid]/status` file.
pub fn status_field<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    content.lines().find_map(|line| {
        let rest = line.strip_prefix(key)?.strip_prefix(':')?;
        rest.split_whitespace().next()
    })
}

/// `VmSize` in kB.
pub fn parse_vm_size_kb(status: &str) -> Result<u64, ParseError> {
    let raw = status_field(status, "VmSize").ok_or_else(|| ParseError::new("missing VmSize"))?;
    raw.parse()
        .map_err(|_| ParseError::new(format!("invalid VmSize `{raw}`")))
}

/// Real uid, the first of the four `Uid` columns.
pub fn parse_uid(status: &str) -> Result<u32, ParseError> {
    let raw = status_field(status, "Uid").ok_or_else(|| ParseError::new("missing Uid"))?;
    raw.parse()
        .map_err(|_| ParseError::new(format!("invalid Uid `{raw}`")))
}

/// `cmdline` bytes with every NUL separator turned into one space.
///
/// The trailing separator is kept, so `a\0b\0` becomes `"a b "`.
pub fn parse_cmdline(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\0', " ")
}

/// Name for `uid` in passwd content (`name:password:uid:...`).
///
/// Comment and blank lines are skipped. When a uid appears more than once the
/// last entry wins.
pub fn parse_passwd_name(content: &str, uid: u32) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split(':');
            let name = parts.next()?;
            let _password = parts.next()?;
            let entry_uid: u32 = parts.next()?.parse().ok()?;
            (entry_uid == uid).then(|| name.to_string())
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_LINE: &str = "1234 (bash) S 1233 1234 1234 0 -1 4194304 100 0 0 0 10 5 2 1 20 0 1 0 12345 12345678 100 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0";

    #[test]
    fn os_pretty_name_strips_quotes() {
        let content = "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nID=ubuntu\n";
        assert_eq!(
            parse_os_pretty_name(content).as_deref(),
            Some("Ubuntu 22.04.3 LTS")
        );
        assert_eq!(parse_os_pretty_name("PRETTY_NAME=Arch Linux").as_deref(), Some("Arch Linux"));
        assert_eq!(parse_os_pretty_name("NAME=x\n"), None);
    }

    #[test]
    fn kernel_release_is_third_token() {
        let content = "Linux version 6.1.0-13-amd64 (debian-kernel@lists.debian.org) #1 SMP\n";
        assert_eq!(parse_kernel_release(content).as_deref(), Some("6.1.0-13-amd64"));
        assert_eq!(parse_kernel_release("Linux version"), None);
        assert_eq!(parse_kernel_release(""), None);
    }

    #[test]
    fn pid_names_are_all_digits() {
        assert!(is_pid_name("1"));
        assert!(is_pid_name("40213"));
        assert!(!is_pid_name("self"));
        assert!(!is_pid_name("1abc"));
        assert!(!is_pid_name("."));
        assert!(!is_pid_name(""));
    }

    #[test]
    fn meminfo_utilization() {
        let content = "MemTotal:       16000 kB\nMemFree:         4000 kB\nMemAvailable:   8000 kB\n";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info, MemInfo { total_kb: 16000, free_kb: 4000 });
        assert!((info.utilization() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn meminfo_zero_total_is_zero_utilization() {
        let info = parse_meminfo("MemTotal: 0 kB\nMemFree: 0 kB\n").unwrap();
        assert_eq!(info.utilization(), 0.0);
    }

    #[test]
    fn meminfo_requires_both_fields() {
        assert!(parse_meminfo("MemTotal: 100 kB\n").is_err());
        assert!(parse_meminfo("MemFree: 100 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: lots kB\nMemFree: 1 kB\n").is_err());
    }

    #[test]
    fn uptime_truncates_fraction() {
        assert_eq!(parse_uptime("12345.67 54321.00\n").unwrap(), 12345);
        assert!(parse_uptime("").is_err());
        assert!(parse_uptime("soon").is_err());
    }

    #[test]
    fn cpu_ticks_from_aggregate_line() {
        let ticks = parse_cpu_ticks("cpu 100 0 50 800 0 0 0 0\n").unwrap();
        assert_eq!(ticks.total(), 950);
        assert_eq!(ticks.active(), 150);
        assert_eq!(ticks.idle_total(), 800);
    }

    #[test]
    fn cpu_ticks_found_anywhere_and_first_match_wins() {
        let content = "\
intr 1 2 3
cpu0 1 1 1 1 1 1 1 1 0 0
cpu  10 20 30 40 50 60 70 80 90 100
cpu  1 1 1 1 1 1 1 1 0 0
";
        let ticks = parse_cpu_ticks(content).unwrap();
        assert_eq!(ticks.user, 10);
        assert_eq!(ticks.steal, 80);
        // guest/guest_nice are not part of the total
        assert_eq!(ticks.total(), 360);
    }

    #[test]
    fn cpu_ticks_rejects_missing_or_garbled_line() {
        assert!(parse_cpu_ticks("cpu0 1 2 3\n").is_err());
        assert!(parse_cpu_ticks("cpu a b c\n").is_err());
        assert!(parse_cpu_ticks("cpu\n").is_err());
    }

    #[test]
    fn stat_counters() {
        let content = "cpu 1 2 3 4\nctxt 99\nprocesses 4321\nprocs_running 3\nprocs_blocked 0\n";
        assert_eq!(parse_stat_counter(content, "processes").unwrap(), 4321);
        assert_eq!(parse_stat_counter(content, "procs_running").unwrap(), 3);
        assert!(parse_stat_counter(content, "procs_waiting").is_err());
        assert!(parse_stat_counter("processes\n", "processes").is_err());
    }

    #[test]
    fn proc_stat_basic() {
        let stat = parse_proc_stat(STAT_LINE).unwrap();
        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1233);
        assert_eq!((stat.utime, stat.stime, stat.cutime, stat.cstime), (10, 5, 2, 1));
        assert_eq!(stat.active_jiffies(), 18);
        assert_eq!(stat.starttime, Some(12345));
    }

    #[test]
    fn proc_stat_comm_with_spaces_and_parens() {
        let line = STAT_LINE.replace("(bash)", "(Web Content (x))");
        let stat = parse_proc_stat(&line).unwrap();
        assert_eq!(stat.comm, "Web Content (x)");
        assert_eq!(stat.active_jiffies(), 18);
        assert_eq!(stat.starttime, Some(12345));
    }

    #[test]
    fn proc_stat_short_record() {
        let short = "5 (k) S 1 0 0 0 -1 0 0 0 0 0 7 3 0 0";
        let stat = parse_proc_stat(short).unwrap();
        assert_eq!(stat.active_jiffies(), 10);
        assert_eq!(stat.starttime, None);
        assert!(parse_proc_stat("5 (k) S 1").is_err());
    }

    #[test]
    fn proc_stat_bad_starttime_keeps_cpu_fields() {
        let line = STAT_LINE.replace(" 12345 12345678 ", " soon 12345678 ");
        let stat = parse_proc_stat(&line).unwrap();
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.active_jiffies(), 18);
        assert_eq!(stat.starttime, None);
    }

    #[test]
    fn cpu_line_with_extreme_counter() {
        let ticks = parse_cpu_ticks(&format!("cpu {} 1 0 {} 0 0 0 0\n", u64::MAX, u64::MAX)).unwrap();
        assert_eq!(ticks.active(), u64::MAX);
        assert_eq!(ticks.total(), u64::MAX);
    }

    #[test]
    fn status_fields() {
        let status = "Name:\tbash\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t   20480 kB\nVmRSS:\t 4096 kB\n";
        assert_eq!(parse_uid(status).unwrap(), 1000);
        assert_eq!(parse_vm_size_kb(status).unwrap(), 20480);
        assert!(parse_vm_size_kb("Name:\tkworker\n").is_err());
    }

    #[test]
    fn cmdline_keeps_trailing_separator() {
        assert_eq!(parse_cmdline(b"/bin/foo\0--flag\0val\0"), "/bin/foo --flag val ");
        assert_eq!(parse_cmdline(b""), "");
    }

    #[test]
    fn passwd_lookup() {
        let passwd = "\
# comment
root:x:0:0:root:/root:/bin/bash
alice:x:1000:1000:Alice:/home/alice:/bin/zsh
";
        assert_eq!(parse_passwd_name(passwd, 1000).as_deref(), Some("alice"));
        assert_eq!(parse_passwd_name(passwd, 0).as_deref(), Some("root"));
        assert_eq!(parse_passwd_name(passwd, 4242), None);
    }

    #[test]
    fn passwd_duplicate_uid_last_wins() {
        let passwd = "first:x:1000:1000::/:/bin/sh\nsecond:x:1000:1000::/:/bin/sh\n";
        assert_eq!(parse_passwd_name(passwd, 1000).as_deref(), Some("second"));
    }
}
