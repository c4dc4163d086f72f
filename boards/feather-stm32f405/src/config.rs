#![deny(unsafe_code)]
#![deny(warnings)]
//! Clock configuration structures

use softrtc_core::DateTime;

/// Software RTC configuration
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Calendar value loaded before the clock starts
    pub initial: DateTime,
    /// Oscillator drift correction, tenths of a second per day
    pub delta_t_tenths: i16,
    /// Core clock feeding SysTick in Hz (SYSCLK, 84 MHz after PLL setup)
    pub core_clock_hz: u32,
    /// Interval between time reports on the log
    pub report_interval_secs: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            initial: DateTime::new(2026, 1, 1, 0, 0, 0),
            delta_t_tenths: 0,
            core_clock_hz: 84_000_000,
            report_interval_secs: 60,
        }
    }
}
