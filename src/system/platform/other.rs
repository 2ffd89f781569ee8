use super::{DEFAULT_CLOCK_TICKS, PlatformExtensions};

/// Non-Linux hosts have no `/proc` to sample; the fixed rate lets mock-backed
/// tests and benches run anywhere.
pub struct Platform;

impl PlatformExtensions for Platform {
    fn clock_ticks_per_second() -> u64 {
        DEFAULT_CLOCK_TICKS
    }
}
