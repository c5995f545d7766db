use std::{f64::consts::PI, iter::successors};

use bon::Builder;
use chrono::{DateTime, Local, TimeDelta, Timelike};
use sunledger_quantities::energy::KilowattHours;

use crate::{
    billing::ConsumptionPoint,
    prelude::*,
    revenue::{DEFAULT_SELF_USE_RATIO, RevenuePoint},
    tariff::Tariff,
};

/// Inclusive time range sampled at a fixed interval.
#[must_use]
#[derive(Copy, Clone, Debug, Builder)]
pub struct SeriesWindow {
    pub start: DateTime<Local>,

    /// Inclusive.
    pub end: DateTime<Local>,

    #[builder(default = TimeDelta::hours(1))]
    pub interval: TimeDelta,
}

impl SeriesWindow {
    /// Sampling timestamps from the start up to and including the end.
    pub fn timestamps(&self) -> Result<impl Iterator<Item = DateTime<Local>>> {
        ensure!(self.interval > TimeDelta::zero(), "the interval must be positive");
        ensure!(self.end >= self.start, "the series ends before it starts");
        let Self { start, end, interval } = *self;
        Ok(successors(Some(start), move |timestamp| timestamp.checked_add_signed(interval))
            .take_while(move |timestamp| *timestamp <= end))
    }

    /// Sampling steps no longer than an hour, each with its span.
    ///
    /// Longer intervals are split into hourly slices, so that every slice gets priced by the
    /// tariff period it starts in. Slices starting after the end are left out.
    pub fn steps(&self) -> Result<impl Iterator<Item = (DateTime<Local>, TimeDelta)>> {
        let Self { end, interval, .. } = *self;
        Ok(self
            .timestamps()?
            .flat_map(move |timestamp| hourly_slices(timestamp, interval))
            .take_while(move |(timestamp, _)| *timestamp <= end))
    }
}

fn hourly_slices(
    start: DateTime<Local>,
    step: TimeDelta,
) -> impl Iterator<Item = (DateTime<Local>, TimeDelta)> {
    let hour = TimeDelta::hours(1);
    successors(Some(TimeDelta::zero()), move |offset| Some(*offset + hour))
        .take_while(move |offset| *offset < step)
        .map(move |offset| (start + offset, (step - offset).min(hour)))
}

/// Generated energy over one sampling step.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Generation {
    pub energy: KilowattHours,

    /// Share consumed on site, `0..=1`.
    pub self_use_ratio: f64,
}

pub trait GenerationProfile {
    fn generation(&self, at: &DateTime<Local>, step: TimeDelta) -> Generation;
}

impl<F> GenerationProfile for F
where
    F: Fn(&DateTime<Local>, TimeDelta) -> Generation,
{
    fn generation(&self, at: &DateTime<Local>, step: TimeDelta) -> Generation {
        self(at, step)
    }
}

pub trait LoadProfile {
    fn consumption(&self, at: &DateTime<Local>, step: TimeDelta) -> KilowattHours;
}

impl<F> LoadProfile for F
where
    F: Fn(&DateTime<Local>, TimeDelta) -> KilowattHours,
{
    fn consumption(&self, at: &DateTime<Local>, step: TimeDelta) -> KilowattHours {
        self(at, step)
    }
}

/// Clear-sky generation: a half sine wave between 06:00 and 18:00.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct SolarCurve {
    /// Energy per hour at solar noon.
    pub peak_hourly_energy: KilowattHours,

    pub self_use_ratio: f64,
}

impl Default for SolarCurve {
    fn default() -> Self {
        Self {
            peak_hourly_energy: KilowattHours::from(100.0),
            self_use_ratio: DEFAULT_SELF_USE_RATIO,
        }
    }
}

impl SolarCurve {
    fn hourly_energy(&self, at: &DateTime<Local>) -> KilowattHours {
        let hour = fractional_hour(at);
        if (6.0..18.0).contains(&hour) {
            self.peak_hourly_energy * ((hour - 6.0) / 12.0 * PI).sin()
        } else {
            KilowattHours::ZERO
        }
    }
}

impl GenerationProfile for SolarCurve {
    fn generation(&self, at: &DateTime<Local>, step: TimeDelta) -> Generation {
        Generation {
            energy: integrate(at, step, |at| self.hourly_energy(at)),
            self_use_ratio: self.self_use_ratio,
        }
    }
}

/// Typical daily consumption of a small business, in hourly bands.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct DailyLoadCurve {
    /// Hourly energy for 00:00–06:00, 06:00–09:00, 09:00–17:00, 17:00–22:00 and 22:00–24:00.
    pub bands: [KilowattHours; 5],
}

impl Default for DailyLoadCurve {
    fn default() -> Self {
        Self {
            bands: [
                KilowattHours::from(3.5),
                KilowattHours::from(20.0),
                KilowattHours::from(40.0),
                KilowattHours::from(55.0),
                KilowattHours::from(15.0),
            ],
        }
    }
}

impl DailyLoadCurve {
    fn hourly_energy(&self, at: &DateTime<Local>) -> KilowattHours {
        let band = match at.hour() {
            0..6 => 0,
            6..9 => 1,
            9..17 => 2,
            17..22 => 3,
            _ => 4,
        };
        self.bands[band]
    }
}

impl LoadProfile for DailyLoadCurve {
    fn consumption(&self, at: &DateTime<Local>, step: TimeDelta) -> KilowattHours {
        integrate(at, step, |at| self.hourly_energy(at))
    }
}

impl Tariff {
    #[instrument(skip_all, fields(start = %window.start, end = %window.end))]
    pub fn revenue_series(
        &self,
        window: &SeriesWindow,
        profile: &impl GenerationProfile,
    ) -> Result<Vec<RevenuePoint>> {
        let points: Vec<_> = window
            .steps()?
            .map(|(timestamp, step)| {
                let generation = profile.generation(&timestamp, step);
                self.revenue_point(timestamp, generation.energy, generation.self_use_ratio)
            })
            .collect();
        debug!(n_points = points.len(), "generated");
        Ok(points)
    }

    /// Sample the load profile, rounding each reading to hundredths before pricing it.
    #[instrument(skip_all, fields(start = %window.start, end = %window.end))]
    pub fn consumption_series(
        &self,
        window: &SeriesWindow,
        profile: &impl LoadProfile,
    ) -> Result<Vec<ConsumptionPoint>> {
        let points: Vec<_> = window
            .steps()?
            .map(|(timestamp, step)| {
                let consumption = profile
                    .consumption(&timestamp, step)
                    .max(KilowattHours::ZERO)
                    .round_to_hundredths();
                self.consumption_point(timestamp, consumption)
            })
            .collect();
        debug!(n_points = points.len(), "generated");
        Ok(points)
    }
}

/// Accumulate the hourly energy over the step, re-sampling it at least every hour.
fn integrate(
    at: &DateTime<Local>,
    step: TimeDelta,
    hourly_energy: impl Fn(&DateTime<Local>) -> KilowattHours,
) -> KilowattHours {
    let mut total = KilowattHours::ZERO;
    let mut offset = TimeDelta::zero();
    while offset < step {
        let sub_step = (step - offset).min(TimeDelta::hours(1));
        total += hourly_energy(&(*at + offset)) * hours(sub_step);
        offset += sub_step;
    }
    total
}

fn fractional_hour(at: &impl Timelike) -> f64 {
    f64::from(at.hour()) + f64::from(at.minute()) / 60.0
}

#[expect(clippy::cast_precision_loss)]
fn hours(step: TimeDelta) -> f64 {
    step.num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use sunledger_quantities::cost::Cost;

    use super::*;
    use crate::tariff::{Period, TariffConfig, tests::local};

    fn tariff() -> Tariff {
        Tariff::try_from(TariffConfig::default()).unwrap()
    }

    fn day() -> SeriesWindow {
        SeriesWindow::builder().start(local(0, 0)).end(local(23, 0)).build()
    }

    #[test]
    fn test_timestamps_inclusive() {
        let timestamps: Vec<_> = day().timestamps().unwrap().collect();
        assert_eq!(timestamps.len(), 24);
        assert_eq!(timestamps[0], local(0, 0));
        assert_eq!(timestamps[23], local(23, 0));

        let window = SeriesWindow::builder()
            .start(local(10, 0))
            .end(local(10, 50))
            .interval(TimeDelta::minutes(15))
            .build();
        assert_eq!(window.timestamps().unwrap().count(), 4);
    }

    #[test]
    fn test_steps_split_into_hours() {
        let window = SeriesWindow::builder()
            .start(local(0, 0))
            .end(local(2, 30))
            .interval(TimeDelta::minutes(90))
            .build();
        let steps: Vec<_> = window.steps().unwrap().collect();
        assert_eq!(
            steps,
            [
                (local(0, 0), TimeDelta::hours(1)),
                (local(1, 0), TimeDelta::minutes(30)),
                (local(1, 30), TimeDelta::hours(1)),
                (local(2, 30), TimeDelta::minutes(30)),
            ],
        );
    }

    #[test]
    fn test_daily_interval_prices_by_the_hour() {
        let tariff = tariff();
        let daily = SeriesWindow::builder()
            .start(local(0, 0))
            .end(local(23, 0))
            .interval(TimeDelta::days(1))
            .build();
        let load = DailyLoadCurve::default();
        let points = tariff.consumption_series(&daily, &load).unwrap();
        assert_eq!(points, tariff.consumption_series(&day(), &load).unwrap());

        let by_period = tariff.consumption_by_period(&points);
        assert_eq!(by_period.peak, KilowattHours::from(320.0));
        assert_eq!(by_period.valley, KilowattHours::from(21.0));
        assert_eq!(by_period.flat, KilowattHours::from(365.0));
        assert_abs_diff_eq!(tariff.period_cost(by_period).total.0.0, 444.8, epsilon = 1e-9);

        let solar = SolarCurve::default();
        assert_eq!(
            tariff.revenue_series(&daily, &solar).unwrap(),
            tariff.revenue_series(&day(), &solar).unwrap(),
        );
    }

    #[test]
    fn test_single_point() {
        let window = SeriesWindow::builder().start(local(10, 0)).end(local(10, 0)).build();
        assert_eq!(window.timestamps().unwrap().count(), 1);
    }

    #[test]
    fn test_invalid_window() {
        let window = SeriesWindow::builder().start(local(10, 0)).end(local(9, 0)).build();
        assert!(window.timestamps().is_err());

        let window = SeriesWindow::builder()
            .start(local(9, 0))
            .end(local(10, 0))
            .interval(TimeDelta::zero())
            .build();
        assert!(window.timestamps().is_err());
    }

    #[test]
    fn test_solar_curve() {
        let curve = SolarCurve::default();
        let hour = TimeDelta::hours(1);
        assert_eq!(curve.generation(&local(5, 0), hour).energy, KilowattHours::ZERO);
        assert_eq!(curve.generation(&local(18, 0), hour).energy, KilowattHours::ZERO);
        assert_abs_diff_eq!(curve.generation(&local(12, 0), hour).energy.0.0, 100.0);
        assert_abs_diff_eq!(
            curve.generation(&local(12, 0), TimeDelta::minutes(15)).energy.0.0,
            25.0,
        );
        assert_abs_diff_eq!(
            curve.generation(&local(9, 0), hour).energy.0.0,
            70.710_678,
            epsilon = 1e-6,
        );
    }

    #[test]
    fn test_daily_load_curve() {
        let curve = DailyLoadCurve::default();
        let hour = TimeDelta::hours(1);
        assert_eq!(curve.consumption(&local(5, 59), hour), KilowattHours::from(3.5));
        assert_eq!(curve.consumption(&local(6, 0), hour), KilowattHours::from(20.0));
        assert_eq!(curve.consumption(&local(21, 0), hour), KilowattHours::from(55.0));
        assert_eq!(
            curve.consumption(&local(23, 0), TimeDelta::minutes(30)),
            KilowattHours::from(7.5),
        );
        assert_eq!(
            curve.consumption(&local(0, 0), TimeDelta::days(1)),
            KilowattHours::from(6.0 * 3.5 + 3.0 * 20.0 + 8.0 * 40.0 + 5.0 * 55.0 + 2.0 * 15.0),
        );
    }

    #[test]
    fn test_solar_curve_daily() {
        let generation = SolarCurve::default().generation(&local(0, 0), TimeDelta::days(1));
        // Hourly samples of the half sine wave from 06:00 to 17:00:
        assert_abs_diff_eq!(generation.energy.0.0, 759.575_411, epsilon = 1e-6);
    }

    #[test]
    fn test_revenue_series() {
        let points = tariff().revenue_series(&day(), &SolarCurve::default()).unwrap();
        assert_eq!(points.len(), 24);
        assert_eq!(points[3].energy, KilowattHours::ZERO);
        assert_eq!(points[3].revenue, Cost::ZERO);
        assert_eq!(points[3].period, Period::Valley);
        assert_eq!(points[9].period, Period::Peak);
        assert_abs_diff_eq!(points[12].energy.0.0, 100.0);

        // 70 kWh at 0.5, 30 kWh at 0.35, and the subsidy on all 100 kWh:
        assert_abs_diff_eq!(points[12].revenue.0.0, 35.0 + 10.5 + 42.0);
    }

    #[test]
    fn test_series_is_restartable() {
        let tariff = tariff();
        let first = tariff.revenue_series(&day(), &SolarCurve::default()).unwrap();
        let second = tariff.revenue_series(&day(), &SolarCurve::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_closure_profiles() {
        let tariff = tariff();
        let flat_generation = |_: &DateTime<Local>, _: TimeDelta| Generation {
            energy: KilowattHours::from(1.0),
            self_use_ratio: 1.0,
        };
        let points = tariff.revenue_series(&day(), &flat_generation).unwrap();
        assert!(points.iter().all(|point| point.grid_energy == KilowattHours::ZERO));

        let constant_load = |_: &DateTime<Local>, _: TimeDelta| KilowattHours::from(2.0);
        let points = tariff.consumption_series(&day(), &constant_load).unwrap();
        let total_cost: Cost = points.iter().map(|point| point.cost).sum();
        // 7 peak, 6 valley and 11 flat hours at 2 kWh each:
        assert_abs_diff_eq!(
            total_cost.0.0,
            2.0 * (7.0 * 0.8 + 6.0 * 0.3 + 11.0 * 0.5),
            epsilon = 1e-9,
        );
    }
}
