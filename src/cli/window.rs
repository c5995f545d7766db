use chrono::{DateTime, Local, TimeDelta};
use clap::Parser;
use sunledger::{prelude::*, series::SeriesWindow, statistics::StatsPeriod};

#[derive(Parser)]
pub struct WindowArgs {
    /// Statistics period, counted from its start up to now.
    #[clap(long, env = "STATS_PERIOD", default_value = "day")]
    pub period: StatsPeriod,

    /// Sampling interval, an hour for a day and a day for the longer periods by default.
    #[clap(long, env = "SAMPLE_INTERVAL")]
    pub interval: Option<humantime::Duration>,
}

impl WindowArgs {
    pub fn interval(&self) -> Result<TimeDelta> {
        match self.interval {
            Some(interval) => {
                TimeDelta::from_std(interval.into()).context("the interval is too long")
            }
            None => Ok(self.period.sample_interval()),
        }
    }

    pub fn current(&self, now: DateTime<Local>) -> Result<SeriesWindow> {
        Ok(SeriesWindow::builder()
            .start(self.period.start_of(now)?)
            .end(now)
            .interval(self.interval()?)
            .build())
    }
}
