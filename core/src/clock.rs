//! Clock facade and the state shared with the tick context
//!
//! [`SharedClock`] owns the calendar and drift state behind a
//! `critical_section::Mutex`. The tick interrupt calls
//! [`SharedClock::on_tick`]; normal code goes through [`SoftRtc`], which
//! validates input and wraps every access in a short critical section so
//! neither side ever sees a half-updated calendar.

use core::cell::RefCell;

use critical_section::Mutex;
use softrtc_hal::TickSource;

use crate::calendar::{
    calendar_to_epoch_seconds, epoch_seconds_to_calendar, is_leap_year, weekday, DateTime, Epoch,
};
use crate::drift::tenths_from_secs_per_day;
use crate::error::{ClockError, TimestampError};
use crate::tick::ClockCore;

/// Clock state shared between the tick handler and the facade
///
/// Construct it in a `static` on firmware targets:
///
/// ```
/// use softrtc_core::SharedClock;
///
/// static CLOCK: SharedClock = SharedClock::new();
///
/// // In the 1 kHz timer interrupt:
/// CLOCK.on_tick();
/// ```
pub struct SharedClock {
    core: Mutex<RefCell<ClockCore>>,
}

impl SharedClock {
    pub const fn new() -> Self {
        Self {
            core: Mutex::new(RefCell::new(ClockCore::new())),
        }
    }

    /// Tick handler entry point, called once per tick source callback
    pub fn on_tick(&self) {
        critical_section::with(|cs| self.core.borrow(cs).borrow_mut().tick());
    }

    /// Run `f` on the shared state inside a critical section
    pub fn with<R>(&self, f: impl FnOnce(&mut ClockCore) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.core.borrow(cs).borrow_mut()))
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Software real-time clock
///
/// Pairs the shared clock state with the [`TickSource`] that drives it.
pub struct SoftRtc<'a, S: TickSource> {
    clock: &'a SharedClock,
    source: S,
}

impl<'a, S: TickSource> SoftRtc<'a, S> {
    /// The tick source is not started until [`start`](Self::start)
    pub fn new(clock: &'a SharedClock, source: S) -> Self {
        Self { clock, source }
    }

    /// Set the time of day
    pub fn set_time(&mut self, hours: u8, minutes: u8, seconds: u8) -> Result<(), ClockError> {
        let checked = if hours > 23 {
            Err(ClockError::InvalidHour)
        } else if minutes > 59 {
            Err(ClockError::InvalidMinute)
        } else if seconds > 59 {
            Err(ClockError::InvalidSecond)
        } else {
            Ok(())
        };
        if let Err(e) = checked {
            warn!("set_time {}:{}:{} rejected: {}", hours, minutes, seconds, e);
            return Err(e);
        }

        self.clock.with(|core| {
            core.state.hours = hours;
            core.state.minutes = minutes;
            core.state.seconds = seconds;
        });
        Ok(())
    }

    /// Set the date
    ///
    /// The day is only checked against 1..=31, not against the month length.
    /// An impossible date such as 31 April rolls over to 1 May at the next
    /// midnight.
    pub fn set_date(&mut self, day: u8, month: u8, year: u16) -> Result<(), ClockError> {
        let checked = if !(1..=31).contains(&day) {
            Err(ClockError::InvalidDay)
        } else if !(1..=12).contains(&month) {
            Err(ClockError::InvalidMonth)
        } else {
            Ok(())
        };
        if let Err(e) = checked {
            warn!("set_date {}/{}/{} rejected: {}", day, month, year, e);
            return Err(e);
        }

        self.clock.with(|core| {
            core.state.day = day;
            core.state.month = month;
            core.state.year = year;
        });
        Ok(())
    }

    /// Start the clock
    ///
    /// Clears the millisecond accumulator and arms the tick source. If the
    /// source cannot be armed the clock stays stopped.
    pub fn start(&mut self) -> Result<(), ClockError> {
        let source = &mut self.source;
        let armed = self.clock.with(|core| {
            core.state.milliseconds = 0;
            let armed = source.start();
            core.state.running = armed.is_ok();
            armed
        });
        match armed {
            Ok(()) => {
                debug!("software RTC started");
                Ok(())
            }
            Err(e) => {
                warn!("software RTC not started: {}", e);
                Err(e.into())
            }
        }
    }

    /// Stop the clock, keeping the calendar
    pub fn stop(&mut self) {
        let source = &mut self.source;
        self.clock.with(|core| {
            source.stop();
            core.state.running = false;
        });
        debug!("software RTC stopped");
    }

    pub fn is_running(&self) -> bool {
        self.clock.with(|core| core.state.running)
    }

    pub fn get_seconds(&self) -> u8 {
        self.clock.with(|core| core.state.seconds)
    }

    pub fn get_minutes(&self) -> u8 {
        self.clock.with(|core| core.state.minutes)
    }

    pub fn get_hours(&self) -> u8 {
        self.clock.with(|core| core.state.hours)
    }

    pub fn get_day(&self) -> u8 {
        self.clock.with(|core| core.state.day)
    }

    pub fn get_month(&self) -> u8 {
        self.clock.with(|core| core.state.month)
    }

    pub fn get_year(&self) -> u16 {
        self.clock.with(|core| core.state.year)
    }

    /// Consistent snapshot of the whole calendar
    pub fn now(&self) -> DateTime {
        self.clock.with(|core| core.state.date_time())
    }

    /// Leap-year test for `year`, or for the clock's current year if `None`
    pub fn is_leap_year(&self, year: Option<u16>) -> bool {
        is_leap_year(year.unwrap_or_else(|| self.get_year()))
    }

    /// Seconds since `epoch` (Unix 1970 if `None`)
    pub fn get_timestamp(&self, epoch: Option<Epoch>) -> u32 {
        calendar_to_epoch_seconds(&self.now(), epoch.unwrap_or_default())
    }

    /// Set the drift correction in tenths of a second per day
    ///
    /// Positive values make a slow clock catch up, negative values hold back
    /// a fast one, zero disables correction.
    pub fn set_delta_t(&mut self, tenths_per_day: i16) -> Result<(), ClockError> {
        match self.clock.with(|core| core.drift.set_rate(tenths_per_day)) {
            Ok(()) => {
                debug!("drift correction set to {} tenths/day", tenths_per_day);
                Ok(())
            }
            Err(e) => {
                warn!("drift rate {} rejected: {}", tenths_per_day, e);
                Err(e)
            }
        }
    }

    /// Set the drift correction in (fractional) seconds per day
    ///
    /// The value is scaled to tenths and truncated toward zero.
    pub fn set_delta_t_secs(&mut self, secs_per_day: f32) -> Result<(), ClockError> {
        let tenths = tenths_from_secs_per_day(secs_per_day).inspect_err(|e| {
            warn!("drift rate {} s/day rejected: {}", secs_per_day, e);
        })?;
        self.set_delta_t(tenths)
    }

    /// Drift correction in effect, tenths of a second per day
    pub fn get_delta_t(&self) -> i16 {
        self.clock.with(|core| core.drift.rate())
    }

    /// Set the whole calendar from seconds since `epoch` (Unix 1970 if `None`)
    ///
    /// On error the calendar is left unchanged.
    pub fn set_clock_with_timestamp(
        &mut self,
        seconds: u32,
        epoch: Option<Epoch>,
    ) -> Result<(), TimestampError> {
        let dt = epoch_seconds_to_calendar(seconds, epoch.unwrap_or_default()).inspect_err(|e| {
            warn!("timestamp {} not converted: {}", seconds, e);
        })?;
        self.clock.with(|core| core.state.set_date_time(&dt));
        Ok(())
    }

    /// Day of the week (0 = Sunday) for seconds since the Unix epoch
    pub fn week_day(&self, seconds: u32) -> u8 {
        weekday(seconds)
    }

    /// Current day of the week (0 = Sunday)
    pub fn get_week_day(&self) -> u8 {
        weekday(self.get_timestamp(None))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Stop the clock and hand back the tick source
    pub fn release(mut self) -> S {
        self.stop();
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekday;
    use softrtc_hal::TickError;

    #[derive(Default)]
    struct MockTickSource {
        starts: u32,
        stops: u32,
        armed: bool,
        fail_start: bool,
    }

    impl TickSource for MockTickSource {
        fn start(&mut self) -> Result<(), TickError> {
            self.starts += 1;
            if self.fail_start {
                return Err(TickError::RateUnreachable { timer_clock_hz: 999 });
            }
            self.armed = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.stops += 1;
            self.armed = false;
        }
    }

    /// Deliver `ticks` callbacks the way an armed timer would
    fn pump(rtc: &SoftRtc<'_, MockTickSource>, clock: &SharedClock, ticks: u32) {
        if rtc.source().armed {
            for _ in 0..ticks {
                clock.on_tick();
            }
        }
    }

    #[test]
    fn test_new_clock_is_zeroed() {
        let clock = SharedClock::new();
        let rtc = SoftRtc::new(&clock, MockTickSource::default());
        assert_eq!(rtc.now(), DateTime::new(0, 0, 0, 0, 0, 0));
        assert!(!rtc.is_running());
        assert_eq!(rtc.get_delta_t(), 0);
        assert_eq!(rtc.source().starts, 0);
    }

    #[test]
    fn test_set_time_all_valid() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        for h in 0..=23 {
            for m in 0..=59 {
                for s in 0..=59 {
                    assert_eq!(rtc.set_time(h, m, s), Ok(()));
                    assert_eq!(rtc.get_hours(), h);
                    assert_eq!(rtc.get_minutes(), m);
                    assert_eq!(rtc.get_seconds(), s);
                }
            }
        }
    }

    #[test]
    fn test_set_time_rejects_without_mutation() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_time(10, 20, 30).unwrap();

        assert_eq!(rtc.set_time(24, 0, 0), Err(ClockError::InvalidHour));
        assert_eq!(rtc.set_time(0, 60, 0), Err(ClockError::InvalidMinute));
        assert_eq!(rtc.set_time(0, 0, 60), Err(ClockError::InvalidSecond));
        assert_eq!(
            (rtc.get_hours(), rtc.get_minutes(), rtc.get_seconds()),
            (10, 20, 30)
        );
    }

    #[test]
    fn test_set_date() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        assert_eq!(rtc.set_date(15, 6, 2023), Ok(()));
        assert_eq!((rtc.get_day(), rtc.get_month(), rtc.get_year()), (15, 6, 2023));

        assert_eq!(rtc.set_date(0, 6, 2023), Err(ClockError::InvalidDay));
        assert_eq!(rtc.set_date(32, 6, 2023), Err(ClockError::InvalidDay));
        assert_eq!(rtc.set_date(1, 0, 2023), Err(ClockError::InvalidMonth));
        assert_eq!(rtc.set_date(1, 13, 2023), Err(ClockError::InvalidMonth));
        assert_eq!((rtc.get_day(), rtc.get_month(), rtc.get_year()), (15, 6, 2023));

        // Not checked against month length
        assert_eq!(rtc.set_date(31, 4, 2023), Ok(()));
        assert_eq!(rtc.set_date(30, 2, 0), Ok(()));
    }

    #[test]
    fn test_start_stop() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_date(28, 2, 2024).unwrap();
        rtc.set_time(23, 59, 59).unwrap();

        rtc.start().unwrap();
        assert!(rtc.is_running());
        assert!(rtc.source().armed);

        pump(&rtc, &clock, 1000);
        assert_eq!(rtc.now(), DateTime::new(2024, 2, 29, 0, 0, 0));

        rtc.stop();
        assert!(!rtc.is_running());
        pump(&rtc, &clock, 5000);
        assert_eq!(rtc.now(), DateTime::new(2024, 2, 29, 0, 0, 0));

        let source = rtc.release();
        assert_eq!(source.starts, 1);
        assert_eq!(source.stops, 2);
    }

    #[test]
    fn test_start_clears_milliseconds() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_date(1, 1, 2024).unwrap();
        rtc.start().unwrap();
        pump(&rtc, &clock, 700);
        rtc.stop();
        assert_eq!(clock.with(|core| core.state.milliseconds), 700);

        rtc.start().unwrap();
        assert_eq!(clock.with(|core| core.state.milliseconds), 0);
        pump(&rtc, &clock, 999);
        assert_eq!(rtc.get_seconds(), 0);
    }

    #[test]
    fn test_start_failure_leaves_clock_stopped() {
        let clock = SharedClock::new();
        let source = MockTickSource {
            fail_start: true,
            ..Default::default()
        };
        let mut rtc = SoftRtc::new(&clock, source);
        rtc.set_date(5, 5, 2020).unwrap();

        assert_eq!(
            rtc.start(),
            Err(ClockError::TickSource(TickError::RateUnreachable {
                timer_clock_hz: 999
            }))
        );
        assert!(!rtc.is_running());
        assert!(!rtc.source().armed);
        pump(&rtc, &clock, 1000);
        assert_eq!(rtc.now(), DateTime::new(2020, 5, 5, 0, 0, 0));
    }

    #[test]
    fn test_is_leap_year() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_date(1, 1, 2024).unwrap();
        assert!(rtc.is_leap_year(None));
        assert!(!rtc.is_leap_year(Some(1900)));
        assert!(rtc.is_leap_year(Some(2000)));
        rtc.set_date(1, 1, 2023).unwrap();
        assert!(!rtc.is_leap_year(None));
    }

    #[test]
    fn test_delta_t() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        assert_eq!(rtc.set_delta_t(-250), Ok(()));
        assert_eq!(rtc.get_delta_t(), -250);

        assert_eq!(rtc.set_delta_t(8_401), Err(ClockError::DriftOutOfRange));
        assert_eq!(rtc.set_delta_t(-8_401), Err(ClockError::DriftOutOfRange));
        assert_eq!(rtc.get_delta_t(), -250);

        assert_eq!(rtc.set_delta_t_secs(12.34), Ok(()));
        assert_eq!(rtc.get_delta_t(), 123);
        assert_eq!(rtc.set_delta_t_secs(-900.0), Err(ClockError::DriftOutOfRange));
        assert_eq!(rtc.get_delta_t(), 123);

        assert_eq!(rtc.set_delta_t(0), Ok(()));
        assert_eq!(rtc.get_delta_t(), 0);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_date(15, 6, 2023).unwrap();
        rtc.set_time(13, 45, 30).unwrap();

        let unix = rtc.get_timestamp(None);
        assert_eq!(unix, 1_686_836_730);
        assert_eq!(rtc.get_timestamp(Some(Epoch::Unix1970)), unix);
        let ntp = rtc.get_timestamp(Some(Epoch::Ntp1900));
        assert!(ntp > unix);

        rtc.set_date(1, 1, 2000).unwrap();
        rtc.set_time(0, 0, 0).unwrap();
        assert_eq!(rtc.set_clock_with_timestamp(unix, None), Ok(()));
        assert_eq!(rtc.now(), DateTime::new(2023, 6, 15, 13, 45, 30));

        rtc.set_date(1, 1, 2000).unwrap();
        assert_eq!(
            rtc.set_clock_with_timestamp(ntp, Some(Epoch::from_year(1900))),
            Ok(())
        );
        assert_eq!(rtc.now(), DateTime::new(2023, 6, 15, 13, 45, 30));
    }

    #[test]
    fn test_set_clock_keeps_milliseconds() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.start().unwrap();
        pump(&rtc, &clock, 250);
        rtc.set_clock_with_timestamp(0, None).unwrap();
        assert_eq!(rtc.now(), DateTime::new(1970, 1, 1, 0, 0, 0));
        assert_eq!(clock.with(|core| core.state.milliseconds), 250);
    }

    #[test]
    fn test_set_clock_failure_keeps_calendar() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_date(5, 5, 2020).unwrap();
        rtc.set_time(1, 2, 3).unwrap();

        // 1974-12-31 00:00:00 UTC, outside what the fixed-length year decodes
        assert_eq!(
            rtc.set_clock_with_timestamp(157_680_000, None),
            Err(TimestampError::MonthOverflow)
        );
        assert_eq!(rtc.now(), DateTime::new(2020, 5, 5, 1, 2, 3));
    }

    #[test]
    fn test_week_day() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        assert_eq!(rtc.week_day(0), 4);
        assert_eq!(rtc.week_day(86_400), 5);

        rtc.set_clock_with_timestamp(946_684_800, None).unwrap(); // 2000-01-01
        assert_eq!(rtc.get_week_day(), 6);
        assert_eq!(Weekday::from_index(rtc.get_week_day()), Some(Weekday::Saturday));
    }

    #[test]
    fn test_drift_through_facade() {
        let clock = SharedClock::new();
        let mut rtc = SoftRtc::new(&clock, MockTickSource::default());
        rtc.set_date(15, 6, 2023).unwrap();
        rtc.set_time(0, 0, 0).unwrap();
        rtc.set_delta_t(864).unwrap();
        rtc.start().unwrap();

        pump(&rtc, &clock, 864_000);
        // 864 corrections of one tick each
        let elapsed_ms = 864_000 + 864;
        assert_eq!(rtc.get_minutes(), (elapsed_ms / 60_000) as u8);
        assert_eq!(rtc.get_seconds(), ((elapsed_ms / 1000) % 60) as u8);
        assert_eq!(
            clock.with(|core| core.state.milliseconds),
            (elapsed_ms % 1000) as u16
        );
    }
}
