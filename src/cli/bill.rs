use chrono::{DateTime, Datelike, Local, Months, TimeDelta};
use itertools::Itertools;
use sunledger::{
    billing::bill::{BillStatus, ElectricityBill},
    prelude::*,
    series::{DailyLoadCurve, GenerationProfile, SeriesWindow, SolarCurve},
    statistics::local_midnight,
    tariff::Tariff,
};
use sunledger_quantities::energy::KilowattHours;

use crate::cli::BillArgs;

/// Bill the profiled consumption of the window's months, the current month up to now.
#[instrument(skip_all, fields(window = ?args.window))]
pub fn report_bills(
    tariff: &Tariff,
    args: &BillArgs,
    now: DateTime<Local>,
) -> Result<Vec<ElectricityBill>> {
    let this_month = now.date_naive().with_day(1).context("the month has no first day")?;
    let load = DailyLoadCurve::default();
    let solar = SolarCurve {
        peak_hourly_energy: args.generation.peak_hourly_energy,
        ..SolarCurve::default()
    };

    let mut bills = Vec::new();
    for months_back in (0..args.window.months()).rev() {
        let month = this_month
            .checked_sub_months(Months::new(months_back))
            .context("the bill window starts outside the calendar")?;
        let next_month =
            month.checked_add_months(Months::new(1)).context("the month never ends")?;
        let window = SeriesWindow::builder()
            .start(local_midnight(month)?)
            .end(now.min(local_midnight(next_month)? - TimeDelta::hours(1)))
            .build();

        let points = tariff.consumption_series(&window, &load)?;
        let chunks = points.iter().chunk_by(|point| point.timestamp.date_naive());
        let days = chunks
            .into_iter()
            .map(|(date, points)| tariff.daily_consumption(date, points))
            .collect_vec();
        let generation: KilowattHours = window
            .steps()?
            .map(|(timestamp, step)| solar.generation(&timestamp, step).energy)
            .sum();

        let status = if months_back == 0 { BillStatus::Pending } else { BillStatus::Paid };
        bills.extend(tariff.monthly_bill(month, &days, generation, status));
    }
    Ok(bills)
}
