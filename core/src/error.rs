//! Clock error types

use softrtc_hal::TickError;

/// Rejected caller input
///
/// Returned by the setters on [`SoftRtc`](crate::SoftRtc). The clock state
/// is never partially updated when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Hour outside 0..=23
    InvalidHour,
    /// Minute outside 0..=59
    InvalidMinute,
    /// Second outside 0..=59
    InvalidSecond,
    /// Day outside 1..=31
    InvalidDay,
    /// Month outside 1..=12
    InvalidMonth,
    /// Drift rate outside ±840.0 s/day
    DriftOutOfRange,
    /// Tick source could not be armed, clock left stopped
    TickSource(TickError),
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidHour => write!(f, "Hour out of range"),
            Self::InvalidMinute => write!(f, "Minute out of range"),
            Self::InvalidSecond => write!(f, "Second out of range"),
            Self::InvalidDay => write!(f, "Day out of range"),
            Self::InvalidMonth => write!(f, "Month out of range"),
            Self::DriftOutOfRange => write!(f, "Drift rate out of range"),
            Self::TickSource(e) => write!(f, "Tick source failed: {}", e),
        }
    }
}

impl core::error::Error for ClockError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::TickSource(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TickError> for ClockError {
    fn from(e: TickError) -> Self {
        Self::TickSource(e)
    }
}

/// Timestamp decoding failures
///
/// All variants except [`YearBeforeEpoch`](Self::YearBeforeEpoch) mean the
/// 365.2422-day year approximation did not converge for the input. The
/// calendar is left untouched and should not be trusted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimestampError {
    /// Day remainder reached a full year
    DayRemainderExceedsYear,
    /// Decoded year precedes the epoch
    YearBeforeEpoch,
    /// Month walk ran past December
    MonthOverflow,
    /// Day remainder reached a day's worth of seconds
    DayRemainderExceedsDay,
    /// Remainder after hours is an hour or more
    MinuteRemainderOutOfRange,
    /// Remainder after minutes is a minute or more
    SecondRemainderOutOfRange,
}

impl TimestampError {
    /// Numeric status (1-6) as reported by the classic library API
    pub const fn code(self) -> u8 {
        match self {
            Self::DayRemainderExceedsYear => 1,
            Self::YearBeforeEpoch => 2,
            Self::MonthOverflow => 3,
            Self::DayRemainderExceedsDay => 4,
            Self::MinuteRemainderOutOfRange => 5,
            Self::SecondRemainderOutOfRange => 6,
        }
    }

    /// `true` when the timestamp itself was unusable, `false` when the
    /// conversion arithmetic went out of tolerance
    pub const fn is_caller_error(self) -> bool {
        matches!(self, Self::YearBeforeEpoch)
    }
}

impl core::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DayRemainderExceedsYear => write!(f, "Day remainder exceeds one year"),
            Self::YearBeforeEpoch => write!(f, "Year precedes epoch"),
            Self::MonthOverflow => write!(f, "Month overflow"),
            Self::DayRemainderExceedsDay => write!(f, "Day remainder exceeds one day"),
            Self::MinuteRemainderOutOfRange => write!(f, "Minute remainder out of range"),
            Self::SecondRemainderOutOfRange => write!(f, "Second remainder out of range"),
        }
    }
}

impl core::error::Error for TimestampError {}
