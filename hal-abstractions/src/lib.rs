//! Hardware abstraction traits for the software RTC
//!
//! This crate defines the one capability the clock core needs from the
//! hardware: a periodic tick. Board support crates implement [`TickSource`]
//! on whatever timer they can spare (SysTick, a basic timer, ...).

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

/// Callback cadence every [`TickSource`] must deliver (1 kHz, one tick per millisecond)
pub const TICK_RATE_HZ: u32 = 1_000;

/// Reasons a tick source could not be armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickError {
    /// The timer clock cannot be divided down to [`TICK_RATE_HZ`]
    RateUnreachable {
        /// Clock feeding the timer
        timer_clock_hz: u32,
    },
}

impl core::fmt::Display for TickError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RateUnreachable { timer_clock_hz } => {
                write!(f, "Cannot derive a 1 kHz tick from {} Hz", timer_clock_hz)
            }
        }
    }
}

impl core::error::Error for TickError {}

/// A periodic 1 kHz callback provider
///
/// Contract for implementors:
/// - after a successful [`start`](TickSource::start), invoke the clock's
///   tick handler once per millisecond
/// - when `start` fails, deliver no ticks
/// - after [`stop`](TickSource::stop), invoke it no more
/// - never run two tick callbacks concurrently (an interrupt handler that
///   does not re-enter itself satisfies this)
///
/// The callback wiring itself (interrupt vector, RTIC task binding) belongs
/// to the board; this trait only arms and disarms the timer.
pub trait TickSource {
    /// Compute the timer reload from the current clock tree and start
    /// delivering ticks
    fn start(&mut self) -> Result<(), TickError>;

    /// Stop delivering ticks
    fn stop(&mut self);
}

/// Timer counts per tick for a timer clocked at `timer_clock_hz`
///
/// Fails when the clock is too slow to produce a 1 kHz tick.
pub const fn counts_per_tick(timer_clock_hz: u32) -> Result<u32, TickError> {
    let counts = timer_clock_hz / TICK_RATE_HZ;
    if counts == 0 {
        Err(TickError::RateUnreachable { timer_clock_hz })
    } else {
        Ok(counts)
    }
}
