//! Calendar math and epoch-timestamp conversions
//!
//! Conversions between the clock's calendar fields and a flat count of
//! seconds since 1 January of the epoch year (1900 or 1970).
//!
//! **Limitations**:
//! - Years are measured with a fixed 365.2422-day length, not by counting
//!   leap days. Timestamps therefore drift from true Unix/NTP time by up to
//!   one day, and 31 December of most leap years encodes to the same second
//!   count as 1 January of the following year.
//! - Some counts that land close to a year boundary decode to a day
//!   remainder longer than the year (for example `157_680_000`, 31 December
//!   1974). [`epoch_seconds_to_calendar`] rejects these with
//!   [`TimestampError::MonthOverflow`].
//! - A one-day century-leap correction is applied to every count past
//!   `951_847_199` regardless of the epoch.
//! - Timestamps are 32-bit; dates past the representable range saturate.
//! - UTC only (no timezone support)

use core::fmt::Write;

use heapless::String;

use crate::error::TimestampError;

/// Seconds in one day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Mean tropical year length used for year offsets
pub const DAYS_PER_YEAR: f64 = 365.2422;

/// Last epoch second before 1 March 2000; counts above it get the
/// century-leap correction
pub const CENTURY_LEAP_THRESHOLD: u32 = 951_847_199;

/// Length of `YYYY-MM-DDTHH:MM:SS`
pub const ISO8601_LEN: usize = 19;

const DAYS_PER_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Reference year for timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Epoch {
    /// 1 January 1900 (NTP era 0)
    Ntp1900,
    /// 1 January 1970 (Unix)
    #[default]
    Unix1970,
}

impl Epoch {
    /// Map a requested epoch year to a supported epoch
    ///
    /// 1900 selects [`Epoch::Ntp1900`]; every other year is coerced to
    /// [`Epoch::Unix1970`].
    pub const fn from_year(year: u16) -> Self {
        match year {
            1900 => Self::Ntp1900,
            _ => Self::Unix1970,
        }
    }

    /// Calendar year the epoch starts in
    pub const fn year(self) -> u16 {
        match self {
            Self::Ntp1900 => 1900,
            Self::Unix1970 => 1970,
        }
    }
}

/// Day of the week, numbered from Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Weekday for an index in 0..=6 (0 = Sunday)
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Sunday),
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            _ => None,
        }
    }
}

/// Calendar date and time of day, one-second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Format as `YYYY-MM-DDTHH:MM:SS`
    ///
    /// Years above 9999 do not fit and yield an empty string.
    pub fn to_iso8601(&self) -> String<ISO8601_LEN> {
        let mut out = String::new();
        if write!(
            out,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
        .is_err()
        {
            out.clear();
        }
        out
    }
}

/// Check if year is a leap year (Gregorian calendar)
///
/// - 2000: leap (divisible by 400)
/// - 1900: NOT leap (divisible by 100 but not 400)
/// - 2024: leap (divisible by 4, not by 100)
pub fn is_leap_year(year: u16) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

/// Number of days in `month` (1-12) of `year`
///
/// An unset month (0, as in a freshly constructed clock) or any value above
/// 12 is treated as a 31-day month.
pub fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS_PER_MONTH[usize::from(month - 1)],
        _ => 31,
    }
}

/// Day of the week for an epoch-second count, 0 = Sunday .. 6 = Saturday
///
/// Second 0 of the Unix epoch (1 January 1970) was a Thursday.
pub fn weekday(epoch_seconds: u32) -> u8 {
    ((epoch_seconds / SECONDS_PER_DAY + 4) % 7) as u8
}

/// Convert a calendar date/time to seconds since the start of `epoch`
///
/// Never fails: dates before the epoch saturate to 0 and dates past the
/// 32-bit range saturate to `u32::MAX`.
pub fn calendar_to_epoch_seconds(dt: &DateTime, epoch: Epoch) -> u32 {
    const SECS: u64 = SECONDS_PER_DAY as u64;

    let Some(years) = dt.year.checked_sub(epoch.year()) else {
        return 0;
    };

    let mut days = (f64::from(years) * DAYS_PER_YEAR) as u64;
    for month in 1..dt.month.min(13) {
        days += u64::from(days_in_month(month, dt.year));
    }
    days += u64::from(dt.day);

    let mut secs = ((days * 24 + u64::from(dt.hour)) * 60 + u64::from(dt.minute)) * 60
        + u64::from(dt.second);

    // 2000 is a century leap year the 365.2422 approximation misses
    if secs > u64::from(CENTURY_LEAP_THRESHOLD) {
        secs += SECS;
    }
    // Days of the month count from 1, not 0
    let secs = secs.saturating_sub(SECS);

    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Convert seconds since the start of `epoch` to a calendar date/time
///
/// Inverse of [`calendar_to_epoch_seconds`], subject to the limitations in
/// the module docs. Each intermediate bound is checked and reported as a
/// distinct [`TimestampError`].
pub fn epoch_seconds_to_calendar(seconds: u32, epoch: Epoch) -> Result<DateTime, TimestampError> {
    const SECS: u64 = SECONDS_PER_DAY as u64;

    let mut secs = u64::from(seconds);
    if secs > u64::from(CENTURY_LEAP_THRESHOLD) {
        secs -= SECS;
    }
    secs += SECS;

    let whole_days = secs / SECS;
    let time_of_day = secs % SECS;

    let year_offset = (whole_days as f64 / DAYS_PER_YEAR) as u64;
    let mut day_remainder = whole_days as f64 - year_offset as f64 * DAYS_PER_YEAR;
    if day_remainder >= DAYS_PER_YEAR {
        return Err(TimestampError::DayRemainderExceedsYear);
    }

    let year = i64::from(epoch.year()) + year_offset as i64;
    if year < i64::from(epoch.year()) {
        return Err(TimestampError::YearBeforeEpoch);
    }
    // u32 seconds span at most ~136 years past the epoch
    let year = year as u16;

    let mut month = 1u8;
    loop {
        let month_len = f64::from(days_in_month(month, year));
        if day_remainder <= month_len {
            break;
        }
        day_remainder -= month_len;
        month += 1;
        if month > 12 {
            return Err(TimestampError::MonthOverflow);
        }
    }

    if day_remainder >= f64::from(SECONDS_PER_DAY) {
        return Err(TimestampError::DayRemainderExceedsDay);
    }
    // Round a partial day up: the remainder is 1-based
    let mut day = day_remainder as u8;
    if day_remainder > f64::from(day) {
        day += 1;
    }

    let hour = time_of_day / 3600;
    let remaining = time_of_day - hour * 3600;
    if remaining >= 3600 {
        return Err(TimestampError::MinuteRemainderOutOfRange);
    }
    let minute = remaining / 60;
    let second = remaining - minute * 60;
    if second >= 60 {
        return Err(TimestampError::SecondRemainderOutOfRange);
    }

    Ok(DateTime::new(
        year,
        month,
        day,
        hour as u8,
        minute as u8,
        second as u8,
    ))
}
