use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Hours added to every UTC timestamp before it is displayed.
///
/// The offset is fixed year-round; there is no daylight-saving lookup.
pub const LOCAL_OFFSET_HOURS: i64 = 8;

/// Shift a UTC instant to UTC+8 wall-clock time.
///
/// Returns `None` for instants within eight hours of chrono's upper bound.
pub fn to_local(utc: DateTime<Utc>) -> Option<NaiveDateTime> {
    utc.naive_utc()
        .checked_add_signed(Duration::hours(LOCAL_OFFSET_HOURS))
}

/// The calendar date in UTC+8 at the given instant.
pub fn local_today(now: DateTime<Utc>) -> NaiveDate {
    to_local(now).map_or_else(|| now.date_naive(), |local| local.date())
}

/// A wall-clock time of day, minute precision.
///
/// Always displayed as zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Returns `None` unless `hour < 24` and `minute < 60`.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    fn of(local: &NaiveDateTime) -> Self {
        // chrono guarantees hour() < 24 and minute() < 60.
        Self {
            hour: local.hour() as u8,
            minute: local.minute() as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One night of sleep as it will be posted.
///
/// `date` is the day the record belongs to. A sleep that starts before
/// midnight and ends after it belongs to the wake day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub sleep: Option<ClockTime>,
    pub wake: Option<ClockTime>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, sleep: Option<ClockTime>, wake: Option<ClockTime>) -> Self {
        Self { date, sleep, wake }
    }

    /// Build a record from raw UTC timestamps.
    ///
    /// Both timestamps are shifted to UTC+8 first; the record date then
    /// follows [`attribute_date`]. `requested` is only used when neither
    /// timestamp is present. A timestamp that cannot be shifted counts as
    /// absent.
    pub fn from_utc(
        requested: NaiveDate,
        sleep: Option<DateTime<Utc>>,
        wake: Option<DateTime<Utc>>,
    ) -> Self {
        let sleep = sleep.and_then(to_local);
        let wake = wake.and_then(to_local);

        Self {
            date: attribute_date(requested, sleep.as_ref(), wake.as_ref()),
            sleep: sleep.as_ref().map(ClockTime::of),
            wake: wake.as_ref().map(ClockTime::of),
        }
    }

    /// True when neither time is known. Such records are never posted.
    pub fn is_empty(&self) -> bool {
        self.sleep.is_none() && self.wake.is_none()
    }
}

/// Pick the calendar day a night of sleep belongs to.
///
/// Wake date wins whenever a wake time exists. Without one the sleep date is
/// used, and with neither the requested date is kept.
pub fn attribute_date(
    requested: NaiveDate,
    sleep: Option<&NaiveDateTime>,
    wake: Option<&NaiveDateTime>,
) -> NaiveDate {
    match (sleep, wake) {
        (_, Some(wake)) => wake.date(),
        (Some(sleep), None) => sleep.date(),
        (None, None) => requested,
    }
}
