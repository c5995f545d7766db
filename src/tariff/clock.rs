use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::Timelike;

use crate::prelude::*;

/// Wall-clock time of day with minute resolution.
///
/// Covers `00:00` up to and including `24:00`, the latter being the end of the day and only
/// valid as the end of an [`HourRange`][crate::tariff::range::HourRange].
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[must_use]
pub struct ClockTime {
    minute_of_day: u16,
}

impl ClockTime {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub const END_OF_DAY: Self = Self { minute_of_day: Self::MINUTES_PER_DAY };

    pub fn try_new(hour: u16, minute: u16) -> Result<Self> {
        ensure!(minute < 60, "minute must be below 60, got {minute}");
        ensure!(
            hour < 24 || (hour == 24 && minute == 0),
            "hour must be below 24 (or exactly 24:00), got {hour:02}:{minute:02}",
        );
        Ok(Self { minute_of_day: hour * 60 + minute })
    }

    /// Truncate the timestamp's wall clock to the minute.
    pub fn of(time: &impl Timelike) -> Self {
        #[expect(clippy::cast_possible_truncation)]
        let minute_of_day = (time.hour() * 60 + time.minute()) as u16;
        Self { minute_of_day }
    }

    #[must_use]
    pub const fn minute_of_day(self) -> u16 {
        self.minute_of_day
    }

    #[must_use]
    pub const fn hour(self) -> u16 {
        self.minute_of_day / 60
    }

    #[must_use]
    pub const fn minute(self) -> u16 {
        self.minute_of_day % 60
    }

    #[must_use]
    pub const fn is_end_of_day(self) -> bool {
        self.minute_of_day == Self::END_OF_DAY.minute_of_day
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (hour, minute) =
            s.split_once(':').with_context(|| format!("`{s}` is not in `HH:MM` form"))?;
        Self::try_new(parse_component(hour)?, parse_component(minute)?)
            .with_context(|| format!("`{s}` is not a valid time of day"))
    }
}

fn parse_component(component: &str) -> Result<u16> {
    ensure!(
        (1..=2).contains(&component.len()) && component.bytes().all(|byte| byte.is_ascii_digit()),
        "`{component}` is not a one- or two-digit number",
    );
    Ok(component.parse()?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    #[test]
    fn test_from_str() {
        let time: ClockTime = "09:59".parse().unwrap();
        assert_eq!(time.hour(), 9);
        assert_eq!(time.minute(), 59);
        assert_eq!("9:05".parse::<ClockTime>().unwrap(), ClockTime::try_new(9, 5).unwrap());
    }

    #[test]
    fn test_end_of_day() {
        let time: ClockTime = "24:00".parse().unwrap();
        assert!(time.is_end_of_day());
        assert_eq!(time, ClockTime::END_OF_DAY);
        assert_eq!(time.to_string(), "24:00");
    }

    #[test]
    fn test_from_str_bad() {
        for bad in ["", "hello", "24", "a:1", "24:01", "25:00", "00:60", "-1:00", "+1:00", "001:00"]
        {
            assert!(bad.parse::<ClockTime>().is_err(), "`{bad}` should be rejected");
        }
    }

    #[test]
    fn test_of() {
        let time = NaiveTime::from_hms_opt(23, 30, 59).unwrap();
        assert_eq!(ClockTime::of(&time).to_string(), "23:30");
    }
}
