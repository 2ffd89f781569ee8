use super::{DEFAULT_CLOCK_TICKS, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn clock_ticks_per_second() -> u64 {
        // SAFETY: sysconf has no preconditions; it returns -1 on error.
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks > 0 {
            ticks as u64
        } else {
            DEFAULT_CLOCK_TICKS
        }
    }
}
