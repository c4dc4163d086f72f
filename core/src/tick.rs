//! Tick handler: the per-millisecond calendar state machine

use crate::calendar::{days_in_month, DateTime};
use crate::drift::{DriftCorrector, TickAdjustment};

/// Calendar fields advanced by the tick handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    /// 0-999, accumulator within the current second
    pub milliseconds: u16,
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
    /// Tick source is delivering callbacks
    pub running: bool,
}

impl ClockState {
    /// All fields zeroed, not running
    pub const fn new() -> Self {
        Self {
            milliseconds: 0,
            seconds: 0,
            minutes: 0,
            hours: 0,
            day: 0,
            month: 0,
            year: 0,
            running: false,
        }
    }

    /// Count one tick and ripple any overflow up to the year
    pub fn advance(&mut self, adjustment: TickAdjustment) {
        self.milliseconds += adjustment.millis();
        if self.milliseconds < 1000 {
            return;
        }
        self.milliseconds -= 1000;

        self.seconds += 1;
        if self.seconds < 60 {
            return;
        }
        self.seconds = 0;

        self.minutes += 1;
        if self.minutes < 60 {
            return;
        }
        self.minutes = 0;

        self.hours += 1;
        if self.hours < 24 {
            return;
        }
        self.hours = 0;

        self.day += 1;
        if self.day <= days_in_month(self.month, self.year) {
            return;
        }
        self.day = 1;

        self.month += 1;
        if self.month <= 12 {
            return;
        }
        self.month = 1;
        self.year = self.year.saturating_add(1);
    }

    /// Calendar part of the state, milliseconds dropped
    pub fn date_time(&self) -> DateTime {
        DateTime::new(
            self.year,
            self.month,
            self.day,
            self.hours,
            self.minutes,
            self.seconds,
        )
    }

    /// Overwrite every calendar field from `dt`
    ///
    /// The millisecond accumulator and the running flag are kept.
    pub fn set_date_time(&mut self, dt: &DateTime) {
        self.year = dt.year;
        self.month = dt.month;
        self.day = dt.day;
        self.hours = dt.hour;
        self.minutes = dt.minute;
        self.seconds = dt.second;
    }
}

/// Calendar plus drift corrector, the record shared with the tick context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockCore {
    pub state: ClockState,
    pub drift: DriftCorrector,
}

impl ClockCore {
    pub const fn new() -> Self {
        Self {
            state: ClockState::new(),
            drift: DriftCorrector::new(),
        }
    }

    /// Handle one tick from the tick source
    pub fn tick(&mut self) {
        let adjustment = self.drift.on_tick();
        self.state.advance(adjustment);
    }
}

impl Default for ClockCore {
    fn default() -> Self {
        Self::new()
    }
}
