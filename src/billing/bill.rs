use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use sunledger_quantities::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate};

use crate::{
    balance::EnergyFlow,
    billing::{ConsumptionPoint, average_price},
    prelude::*,
    tariff::{PerPeriod, Tariff},
};

/// Consumption summary of a single calendar day.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyConsumption {
    pub date: NaiveDate,
    pub consumption: KilowattHours,
    pub cost: Cost,
    pub consumption_by_period: PerPeriod<KilowattHours>,
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    #[display("pending")]
    Pending,

    #[display("paid")]
    Paid,

    #[display("overdue")]
    Overdue,
}

/// Listing window for the bills, counted back from today.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum BillWindow {
    Month,
    Quarter,
    Half,
    Year,
}

impl BillWindow {
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Month => 1,
            Self::Quarter => 3,
            Self::Half => 6,
            Self::Year => 12,
        }
    }
}

/// Electricity bill of one calendar month.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityBill {
    /// `bill-YYYY-MM`.
    pub id: String,

    /// `YYYY-MM`.
    pub period: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_consumption: KilowattHours,
    pub consumption_by_period: PerPeriod<KilowattHours>,

    /// Sum of the daily costs.
    pub total_cost: Cost,

    pub cost_by_period: PerPeriod<Cost>,
    pub average_price: KilowattHourRate,
    pub self_use_energy: KilowattHours,
    pub grid_feed: KilowattHours,

    /// Self-used energy valued at the month's average price.
    pub self_use_saving: Cost,

    pub grid_revenue: Cost,

    /// What is left to pay after the saving and the feed-in revenue.
    pub actual_cost: Cost,

    pub status: BillStatus,
}

impl Tariff {
    /// Summarize the consumption points falling on the date.
    pub fn daily_consumption<'a>(
        &self,
        date: NaiveDate,
        points: impl IntoIterator<Item = &'a ConsumptionPoint>,
    ) -> DailyConsumption {
        let points: Vec<_> =
            points.into_iter().filter(|point| point.timestamp.date_naive() == date).collect();
        DailyConsumption {
            date,
            consumption: points
                .iter()
                .map(|point| point.consumption)
                .sum::<KilowattHours>()
                .round_to_hundredths(),
            cost: points.iter().map(|point| point.cost).sum::<Cost>().round_to_cents(),
            consumption_by_period: self.consumption_by_period(points),
        }
    }

    /// Roll up the days of the month containing `month` into a bill.
    ///
    /// Days outside the month are ignored. Returns [`None`] when no day falls into the month.
    #[instrument(skip_all, fields(month = %month.format("%Y-%m")))]
    pub fn monthly_bill(
        &self,
        month: NaiveDate,
        days: &[DailyConsumption],
        generation: KilowattHours,
        status: BillStatus,
    ) -> Option<ElectricityBill> {
        let start_date = month.with_day(1)?;
        let end_date = start_date.checked_add_months(Months::new(1))?.pred_opt()?;
        let days: Vec<_> = days
            .iter()
            .filter(|day| (start_date..=end_date).contains(&day.date))
            .collect();
        if days.is_empty() {
            debug!("no consumption in the month");
            return None;
        }

        let mut consumption_by_period = PerPeriod::<KilowattHours>::default();
        for day in &days {
            consumption_by_period += day.consumption_by_period;
        }
        let consumption_by_period = consumption_by_period.map(KilowattHours::round_to_hundredths);
        let total_consumption =
            days.iter().map(|day| day.consumption).sum::<KilowattHours>().round_to_hundredths();
        let total_cost = days.iter().map(|day| day.cost).sum::<Cost>().round_to_cents();
        let average_price = average_price(total_cost, total_consumption);

        let flow = EnergyFlow::new(generation, total_consumption);
        let self_use_saving = (flow.self_use * average_price).round_to_cents();
        let grid_revenue = (flow.grid_feed * self.grid_price).round_to_cents();
        let period = start_date.format("%Y-%m").to_string();

        info!(n_days = days.len(), %total_consumption, %total_cost, "rolled up");
        Some(ElectricityBill {
            id: format!("bill-{period}"),
            period,
            start_date,
            end_date,
            total_consumption,
            consumption_by_period,
            total_cost,
            cost_by_period: self.period_cost(consumption_by_period).by_period(),
            average_price,
            self_use_energy: flow.self_use,
            grid_feed: flow.grid_feed,
            self_use_saving,
            grid_revenue,
            actual_cost: (total_cost - self_use_saving - grid_revenue).round_to_cents(),
            status,
        })
    }
}

/// Bills of the months that started after `today` minus the given number of months.
pub fn bills_within(
    bills: &[ElectricityBill],
    months: u32,
    today: NaiveDate,
) -> impl Iterator<Item = &ElectricityBill> {
    let since = today.checked_sub_months(Months::new(months));
    bills.iter().filter(move |bill| since.is_none_or(|since| bill.start_date > since))
}
