/// Jiffies per second when the platform cannot tell us.
pub const DEFAULT_CLOCK_TICKS: u64 = 100;

pub trait PlatformExtensions {
    /// Kernel clock tick rate (`USER_HZ`) used to turn jiffies into seconds.
    fn clock_ticks_per_second() -> u64;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod other;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use other as platform_impl;

pub fn clock_ticks_per_second() -> u64 {
    platform_impl::Platform::clock_ticks_per_second()
}
