use std::sync::Arc;

use proptest::prelude::*;
use proctop::format::elapsed_time;
use proctop::system::mock::MockFs;
use proctop::system::parser::MemInfo;
use proctop::system::process::{ProcessSnapshot, sort_by_cpu};
use proctop::system::reader::{ProcPaths, ProcReader};

proptest! {
    #[test]
    fn elapsed_time_fields(seconds in any::<u64>()) {
        let text = elapsed_time(seconds);
        let parts: Vec<&str> = text.split(':').collect();
        prop_assert_eq!(parts.len(), 3);
        for part in &parts {
            prop_assert!(part.len() >= 2, "field `{}` in `{}`", part, text);
            prop_assert!(part.chars().all(|c| c.is_ascii_digit()));
        }
        prop_assert_eq!(parts[0].parse::<u64>().unwrap(), seconds / 3600);
        prop_assert_eq!(parts[1].parse::<u64>().unwrap(), (seconds % 3600) / 60);
        prop_assert_eq!(parts[2].parse::<u64>().unwrap(), seconds % 60);
    }

    #[test]
    fn memory_utilization_in_unit_range(total_kb in 1u64..u64::MAX, free_kb in any::<u64>()) {
        let util = MemInfo { total_kb, free_kb }.utilization();
        prop_assert!((0.0..=1.0).contains(&util), "utilization {}", util);
    }

    #[test]
    fn sort_by_cpu_is_idempotent(utimes in prop::collection::vec(0u64..500, 0..60)) {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu 5000 0 1000 9000 0 0 0 0\n");
        for (i, utime) in utimes.iter().enumerate() {
            let pid = i as u32 + 1;
            let stat = format!("{pid} (p) S 1 {pid} {pid} 0 -1 0 0 0 0 0 {utime} 0 0 0 20 0 1 0 1 0 0");
            fs.add_process("/proc", pid, &stat, "", b"");
        }
        let reader = Arc::new(ProcReader::new(Arc::new(fs), ProcPaths::default()));

        let mut once: Vec<ProcessSnapshot> = reader
            .pids()
            .into_iter()
            .map(|pid| ProcessSnapshot::new(pid, Arc::clone(&reader)))
            .collect();
        sort_by_cpu(&mut once);
        let first: Vec<u32> = once.iter().map(ProcessSnapshot::pid).collect();

        sort_by_cpu(&mut once);
        let second: Vec<u32> = once.iter().map(ProcessSnapshot::pid).collect();
        prop_assert_eq!(&first, &second);

        let cpus: Vec<f32> = once.iter().map(ProcessSnapshot::cpu_utilization).collect();
        prop_assert!(cpus.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn zero_total_memory_is_zero() {
    assert_eq!(MemInfo { total_kb: 0, free_kb: 0 }.utilization(), 0.0);
    assert_eq!(MemInfo { total_kb: 0, free_kb: 500 }.utilization(), 0.0);
}
