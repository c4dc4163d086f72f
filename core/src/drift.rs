//! Drift correction
//!
//! Biases the effective tick rate so that, averaged over a day, the calendar
//! gains or loses the configured number of tenths of a second. Once every
//! `864000 / magnitude` ticks a single millisecond tick is either doubled
//! (clock running slow) or dropped (clock running fast).

use crate::error::ClockError;

/// Largest accepted correction in tenths of a second per day (840.0 s/day)
pub const MAX_DELTA_T: i16 = 8_400;

/// Tenths of a second in one day (86400 s × 10)
pub const TENTHS_PER_DAY: u32 = 864_000;

/// Which way the corrector pushes the tick count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Correction disabled
    None,
    /// Clock runs slow: insert extra ticks
    SpeedUp,
    /// Clock runs fast: suppress ticks
    SlowDown,
}

/// What the tick handler should do with the current millisecond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickAdjustment {
    /// Normal tick
    Pass,
    /// Count this tick twice
    Insert,
    /// Do not count this tick
    Suppress,
}

impl TickAdjustment {
    /// Milliseconds this tick contributes to the accumulator
    pub const fn millis(self) -> u16 {
        match self {
            Self::Pass => 1,
            Self::Insert => 2,
            Self::Suppress => 0,
        }
    }
}

/// Countdown-based drift corrector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftCorrector {
    magnitude: u16,
    direction: Direction,
    countdown: u32,
}

impl DriftCorrector {
    /// Corrector with correction disabled
    pub const fn new() -> Self {
        Self {
            magnitude: 0,
            direction: Direction::None,
            countdown: 0,
        }
    }

    /// Configure the correction in tenths of a second per day
    ///
    /// Positive values speed the clock up, negative values slow it down and
    /// zero disables correction. Values outside ±[`MAX_DELTA_T`] are
    /// rejected and leave the current configuration in place.
    pub fn set_rate(&mut self, tenths_per_day: i16) -> Result<(), ClockError> {
        if !(-MAX_DELTA_T..=MAX_DELTA_T).contains(&tenths_per_day) {
            return Err(ClockError::DriftOutOfRange);
        }

        self.magnitude = tenths_per_day.unsigned_abs();
        self.direction = match tenths_per_day {
            0 => Direction::None,
            r if r > 0 => Direction::SpeedUp,
            _ => Direction::SlowDown,
        };
        self.countdown = self.period().unwrap_or(0);
        Ok(())
    }

    /// Signed rate in effect, tenths of a second per day (0 if disabled)
    pub fn rate(&self) -> i16 {
        // magnitude <= MAX_DELTA_T, fits i16
        let magnitude = self.magnitude as i16;
        match self.direction {
            Direction::None => 0,
            Direction::SpeedUp => magnitude,
            Direction::SlowDown => -magnitude,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Ticks between two corrections, `None` when disabled
    pub fn period(&self) -> Option<u32> {
        match self.direction {
            Direction::None => None,
            _ => Some(TENTHS_PER_DAY / u32::from(self.magnitude)),
        }
    }

    /// Ticks left until the next correction
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Decide the adjustment for the current tick
    ///
    /// Called exactly once per millisecond tick, before the tick is counted.
    pub fn on_tick(&mut self) -> TickAdjustment {
        let Some(period) = self.period() else {
            return TickAdjustment::Pass;
        };

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return TickAdjustment::Pass;
        }

        self.countdown = period;
        match self.direction {
            Direction::SpeedUp => TickAdjustment::Insert,
            Direction::SlowDown => TickAdjustment::Suppress,
            Direction::None => TickAdjustment::Pass,
        }
    }
}

impl Default for DriftCorrector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a fractional seconds-per-day rate to whole tenths
///
/// The range check runs on the unscaled value (±840.0), then the value is
/// scaled by ten and truncated toward zero. NaN is rejected.
pub fn tenths_from_secs_per_day(secs_per_day: f32) -> Result<i16, ClockError> {
    const MAX_SECS: f32 = MAX_DELTA_T as f32 / 10.0;

    if !(-MAX_SECS..=MAX_SECS).contains(&secs_per_day) {
        return Err(ClockError::DriftOutOfRange);
    }
    Ok((secs_per_day * 10.0) as i16)
}
