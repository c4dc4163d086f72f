//! Platform-agnostic software real-time clock
//!
//! A wall-clock calendar kept entirely in software, advanced by a 1 kHz
//! tick from any spare hardware timer. It has NO hardware dependencies:
//! boards plug in a [`TickSource`](softrtc_hal::TickSource) and route the
//! timer interrupt to [`SharedClock::on_tick`].
//!
//! ## Modules
//! - **`calendar`**: leap years, month lengths, weekday, epoch-second
//!   conversions
//! - **`drift`**: oscillator drift correction (tenths of a second per day)
//! - **`tick`**: per-millisecond state machine with ripple carry up to years
//! - **`clock`**: [`SoftRtc`] facade and the [`SharedClock`] state record
//!
//! ## Usage
//! ```
//! use softrtc_core::{SharedClock, SoftRtc};
//! use softrtc_hal::{TickError, TickSource};
//!
//! struct Timer;
//! impl TickSource for Timer {
//!     fn start(&mut self) -> Result<(), TickError> {
//!         Ok(())
//!     }
//!     fn stop(&mut self) {}
//! }
//!
//! static CLOCK: SharedClock = SharedClock::new();
//!
//! let mut rtc = SoftRtc::new(&CLOCK, Timer);
//! rtc.set_date(5, 1, 2026).unwrap();
//! rtc.set_time(1, 0, 0).unwrap();
//! rtc.set_delta_t(-35).unwrap(); // oscillator runs 3.5 s/day fast
//! rtc.start().unwrap();
//!
//! // Timer interrupt, once per millisecond:
//! CLOCK.on_tick();
//!
//! assert_eq!(rtc.now().to_iso8601().as_str(), "2026-01-05T01:00:00");
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

#[macro_use]
mod fmt;

pub mod calendar;
pub mod clock;
pub mod drift;
pub mod error;
pub mod tick;

pub use calendar::{DateTime, Epoch, Weekday};
pub use clock::{SharedClock, SoftRtc};
pub use drift::{DriftCorrector, TickAdjustment};
pub use error::{ClockError, TimestampError};
pub use tick::ClockState;
