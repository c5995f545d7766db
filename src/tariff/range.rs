use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{prelude::*, tariff::clock::ClockTime};

/// Daily `HH:MM-HH:MM` time range.
///
/// An end at or before the start makes the range cross midnight, except for the literal
/// `24:00` end which always means the end of the same day.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[must_use]
pub struct HourRange {
    /// Inclusive.
    pub start: ClockTime,

    /// Exclusive.
    pub end: ClockTime,
}

impl HourRange {
    pub fn try_new(start: ClockTime, end: ClockTime) -> Result<Self> {
        ensure!(!start.is_end_of_day(), "a range cannot start at 24:00");
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn crosses_midnight(self) -> bool {
        !self.end.is_end_of_day() && self.end.minute_of_day() <= self.start.minute_of_day()
    }

    /// Check whether the range contains the time, start inclusive and end exclusive.
    #[must_use]
    pub const fn contains(self, time: ClockTime) -> bool {
        let start = self.start.minute_of_day();
        let mut end = self.end.minute_of_day();
        let mut time = time.minute_of_day();
        if self.crosses_midnight() {
            // Shift everything past the midnight onto the «next day» scale:
            end += ClockTime::MINUTES_PER_DAY;
            if time < start {
                time += ClockTime::MINUTES_PER_DAY;
            }
        }
        start <= time && time < end
    }

    /// Number of minutes per day covered by the range.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        if self.crosses_midnight() {
            ClockTime::MINUTES_PER_DAY - self.start.minute_of_day() + self.end.minute_of_day()
        } else {
            self.end.minute_of_day() - self.start.minute_of_day()
        }
    }
}

impl Display for HourRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for HourRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) =
            s.split_once('-').with_context(|| format!("`{s}` is not in `HH:MM-HH:MM` form"))?;
        Self::try_new(start.parse()?, end.parse()?)
            .with_context(|| format!("`{s}` is not a valid time range"))
    }
}
