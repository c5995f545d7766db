use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeDelta};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use sunledger_quantities::{
    cost::Cost,
    energy::KilowattHours,
    percent::Percent,
    rate::KilowattHourRate,
};

use crate::{
    billing::{ConsumptionPoint, PeriodCost, average_price},
    prelude::*,
    revenue::{RevenueBreakdown, RevenuePoint, Trend, change_rate},
    tariff::{PerPeriod, Tariff},
};

/// Statistics rollup window.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    #[display("day")]
    Day,

    /// Week starting on Sunday.
    #[display("week")]
    Week,

    #[display("month")]
    Month,

    #[display("year")]
    Year,
}

impl StatsPeriod {
    /// Local midnight at which the period containing `now` starts.
    pub fn start_of(self, now: DateTime<Local>) -> Result<DateTime<Local>> {
        let today = now.date_naive();
        let first_day = match self {
            Self::Day => Some(today),
            Self::Week => {
                today.checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_sunday())))
            }
            Self::Month => today.with_day(1),
            Self::Year => today.with_ordinal(1),
        }
        .with_context(|| format!("the {self} of {today} starts outside the calendar"))?;
        local_midnight(first_day)
    }

    /// Sampling interval of the series backing the period.
    #[must_use]
    pub const fn sample_interval(self) -> TimeDelta {
        match self {
            Self::Day => TimeDelta::hours(1),
            Self::Week | Self::Month | Self::Year => TimeDelta::days(1),
        }
    }
}

/// Start of the day in the local time zone, the earliest one if the clocks go back.
pub fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("there is no local midnight on {date}"))
}

/// Revenue rollup over a statistics period.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStats {
    pub period: StatsPeriod,
    pub total_energy: KilowattHours,
    pub self_use_energy: KilowattHours,
    pub grid_energy: KilowattHours,

    /// Sum of the unrounded components, rounded once.
    pub total_revenue: Cost,

    pub self_use_revenue: Cost,
    pub grid_revenue: Cost,
    pub subsidy_revenue: Cost,
    pub self_use_rate: Percent,
}

/// Consumption and cost rollup over a time window.
#[serde_as]
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityStats {
    pub period: StatsPeriod,

    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub start_time: DateTime<Local>,

    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub end_time: DateTime<Local>,

    pub total_consumption: KilowattHours,
    pub consumption_by_period: PerPeriod<KilowattHours>,

    #[serde(flatten)]
    pub cost: PeriodCost,

    pub average_price: KilowattHourRate,
}

/// Revenue summary of a single day.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub energy: KilowattHours,
    pub revenue: Cost,
    pub self_use_energy: KilowattHours,
    pub grid_energy: KilowattHours,
}

impl DailyRevenue {
    pub const fn new(date: NaiveDate, stats: &RevenueStats) -> Self {
        Self {
            date,
            energy: stats.total_energy,
            revenue: stats.total_revenue,
            self_use_energy: stats.self_use_energy,
            grid_energy: stats.grid_energy,
        }
    }
}

/// Today against yesterday.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOverview {
    pub today_revenue: Cost,
    pub today_energy: KilowattHours,
    pub self_use_rate: Percent,
    pub trend: Trend,

    /// Revenue change since yesterday, zero when yesterday earned nothing.
    pub change_rate: Percent,
}

impl RevenueOverview {
    pub fn new(today: &RevenueStats, yesterday: &RevenueStats) -> Self {
        Self {
            today_revenue: today.total_revenue,
            today_energy: today.total_energy,
            self_use_rate: today.self_use_rate,
            trend: Trend::between(today.total_revenue, yesterday.total_revenue),
            change_rate: change_rate(today.total_revenue, yesterday.total_revenue).round_to(2),
        }
    }
}

impl Tariff {
    /// Roll up the revenue points.
    ///
    /// The self-use revenue is re-priced from each point's own timestamp, so the points'
    /// stored revenues are not used.
    #[instrument(skip_all, fields(period = %period))]
    pub fn revenue_stats<'a>(
        &self,
        points: impl IntoIterator<Item = &'a RevenuePoint>,
        period: StatsPeriod,
    ) -> RevenueStats {
        let mut n_points = 0_usize;
        let mut total_energy = KilowattHours::ZERO;
        let mut self_use_energy = KilowattHours::ZERO;
        let mut grid_energy = KilowattHours::ZERO;
        let mut revenue = RevenueBreakdown::default();

        for point in points {
            n_points += 1;
            total_energy += point.energy;
            self_use_energy += point.self_use_energy;
            grid_energy += point.grid_energy;
            revenue += RevenueBreakdown {
                self_use: point.self_use_energy * self.price_at(&point.timestamp),
                grid: point.grid_energy * self.grid_price,
                subsidy: point.energy * self.subsidy_price,
            };
        }

        let self_use_rate = if total_energy > KilowattHours::ZERO {
            (Percent::from(self_use_energy / total_energy) * 100.0).round_to(2)
        } else {
            Percent::ZERO
        };
        let rounded = revenue.round_to_cents();
        debug!(n_points, %total_energy, "rolled up");
        RevenueStats {
            period,
            total_energy: total_energy.round_to_hundredths(),
            self_use_energy: self_use_energy.round_to_hundredths(),
            grid_energy: grid_energy.round_to_hundredths(),
            total_revenue: revenue.total(),
            self_use_revenue: rounded.self_use,
            grid_revenue: rounded.grid,
            subsidy_revenue: rounded.subsidy,
            self_use_rate,
        }
    }

    /// Roll up the revenue points of every calendar day, in the order of the points.
    pub fn daily_revenue(&self, points: &[RevenuePoint]) -> Vec<DailyRevenue> {
        let chunks = points.iter().chunk_by(|point| point.timestamp.date_naive());
        chunks
            .into_iter()
            .map(|(date, points)| {
                DailyRevenue::new(date, &self.revenue_stats(points, StatsPeriod::Day))
            })
            .collect()
    }

    /// Roll up the consumption points within `start..=end`.
    #[instrument(skip_all, fields(period = %period))]
    pub fn electricity_stats(
        &self,
        points: &[ConsumptionPoint],
        period: StatsPeriod,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> ElectricityStats {
        let points: Vec<_> = points
            .iter()
            .filter(|point| (start_time..=end_time).contains(&point.timestamp))
            .collect();
        let consumption_by_period = self.consumption_by_period(points.iter().copied());
        let total_consumption = points
            .iter()
            .map(|point| point.consumption)
            .sum::<KilowattHours>()
            .round_to_hundredths();
        let cost = self.period_cost(consumption_by_period);
        debug!(n_points = points.len(), %total_consumption, total_cost = %cost.total, "rolled up");
        ElectricityStats {
            period,
            start_time,
            end_time,
            total_consumption,
            consumption_by_period,
            cost,
            average_price: average_price(cost.total, total_consumption),
        }
    }
}
