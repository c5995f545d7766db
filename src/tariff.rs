pub mod clock;
pub mod config;
pub mod period;
pub mod range;

use chrono::{DateTime, TimeZone};
use sunledger_quantities::rate::KilowattHourRate;

pub use self::{
    clock::ClockTime,
    config::TariffConfig,
    period::{PerPeriod, Period},
    range::HourRange,
};
use crate::prelude::*;

/// Validated time-of-use tariff with every optional price filled in.
///
/// This is what the calculations run against. It never changes once built, so it may be
/// shared freely between threads.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tariff {
    pub prices: PerPeriod<KilowattHourRate>,
    pub subsidy_price: KilowattHourRate,
    pub grid_price: KilowattHourRate,
    peak_hours: Vec<HourRange>,
    valley_hours: Vec<HourRange>,
    flat_hours: Vec<HourRange>,
}

impl TryFrom<&TariffConfig> for Tariff {
    type Error = Error;

    #[instrument(skip_all)]
    fn try_from(config: &TariffConfig) -> Result<Self> {
        let tariff = Self {
            prices: PerPeriod::new(config.peak_price, config.valley_price, config.flat_price),
            subsidy_price: config
                .subsidy_price
                .unwrap_or_else(|| TariffConfig::DEFAULT_SUBSIDY_PRICE.into()),
            grid_price: config
                .grid_price
                .unwrap_or_else(|| TariffConfig::DEFAULT_GRID_PRICE.into()),
            peak_hours: parse_ranges(&config.peak_hours).context("invalid peak hours")?,
            valley_hours: parse_ranges(&config.valley_hours).context("invalid valley hours")?,
            flat_hours: parse_ranges(&config.flat_hours).context("invalid flat hours")?,
        };
        for (period, price) in tariff.prices.iter() {
            ensure_price(*price).with_context(|| format!("invalid {period} price"))?;
        }
        ensure_price(tariff.subsidy_price).context("invalid subsidy price")?;
        ensure_price(tariff.grid_price).context("invalid grid price")?;
        debug!(
            n_peak_hours = tariff.peak_hours.len(),
            n_valley_hours = tariff.valley_hours.len(),
            "resolved the tariff",
        );
        Ok(tariff)
    }
}

impl TryFrom<TariffConfig> for Tariff {
    type Error = Error;

    fn try_from(config: TariffConfig) -> Result<Self> {
        Self::try_from(&config)
    }
}

impl Tariff {
    /// Period of the timestamp's wall-clock time in its own time zone.
    ///
    /// Peak hours are checked first, valley hours next, and everything else is flat.
    /// Overlapping ranges are not an error: the first match wins.
    pub fn classify<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Period {
        self.classify_clock_time(ClockTime::of(at))
    }

    pub fn classify_clock_time(&self, time: ClockTime) -> Period {
        if self.peak_hours.iter().any(|range| range.contains(time)) {
            Period::Peak
        } else if self.valley_hours.iter().any(|range| range.contains(time)) {
            Period::Valley
        } else {
            Period::Flat
        }
    }

    pub fn price_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> KilowattHourRate {
        self.price_of(self.classify(at))
    }

    pub const fn price_of(&self, period: Period) -> KilowattHourRate {
        *self.prices.get(period)
    }

    #[must_use]
    pub fn hours(&self, period: Period) -> &[HourRange] {
        match period {
            Period::Peak => &self.peak_hours,
            Period::Valley => &self.valley_hours,
            Period::Flat => &self.flat_hours,
        }
    }
}

fn parse_ranges(ranges: &[String]) -> Result<Vec<HourRange>> {
    ranges.iter().map(|range| range.parse()).collect()
}

fn ensure_price(price: KilowattHourRate) -> Result {
    ensure!(price.is_finite(), "the price must be finite");
    ensure!(price >= KilowattHourRate::ZERO, "the price must not be negative, got {price}");
    Ok(())
}
