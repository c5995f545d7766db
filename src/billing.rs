pub mod bill;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use sunledger_quantities::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate};

use crate::tariff::{PerPeriod, Period, Tariff};

/// Metered consumption over one sampling step.
#[serde_as]
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionPoint {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: DateTime<Local>,

    pub consumption: KilowattHours,

    /// Depends on the tariff the point was built with.
    pub cost: Cost,

    pub period: Period,
}

/// Cost of the consumption split by period.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeriodCost {
    #[serde(rename = "peakCost")]
    pub peak: Cost,

    #[serde(rename = "valleyCost")]
    pub valley: Cost,

    #[serde(rename = "flatCost")]
    pub flat: Cost,

    /// Sum of the already rounded period costs, rounded once more.
    #[serde(rename = "totalCost")]
    pub total: Cost,
}

impl Tariff {
    /// Cost of the consumption at the price in effect at the timestamp, rounded to cents.
    ///
    /// Zero and negative readings cost nothing.
    pub fn cost<Tz: TimeZone>(&self, consumption: KilowattHours, at: &DateTime<Tz>) -> Cost {
        if consumption <= KilowattHours::ZERO {
            return Cost::ZERO;
        }
        (consumption * self.price_at(at)).round_to_cents()
    }

    /// Grid purchase avoided by consuming own generation, rounded to cents.
    pub fn self_use_saving<Tz: TimeZone>(
        &self,
        self_use_energy: KilowattHours,
        at: &DateTime<Tz>,
    ) -> Cost {
        self.cost(self_use_energy, at)
    }

    pub fn consumption_point(
        &self,
        timestamp: DateTime<Local>,
        consumption: KilowattHours,
    ) -> ConsumptionPoint {
        ConsumptionPoint {
            timestamp,
            consumption,
            cost: self.cost(consumption, &timestamp),
            period: self.classify(&timestamp),
        }
    }

    /// Sum up the consumption per period, rounding each total to hundredths.
    ///
    /// The period is re-evaluated from each point's timestamp rather than taken from the point.
    pub fn consumption_by_period<'a>(
        &self,
        points: impl IntoIterator<Item = &'a ConsumptionPoint>,
    ) -> PerPeriod<KilowattHours> {
        let mut totals = PerPeriod::<KilowattHours>::default();
        for point in points {
            *totals.get_mut(self.classify(&point.timestamp)) += point.consumption;
        }
        totals.map(KilowattHours::round_to_hundredths)
    }

    /// Price the per-period consumption.
    ///
    /// Every period cost is rounded to cents on its own, and the total is the rounded sum of
    /// those rounded costs. This may differ by a cent from rounding the exact total.
    pub fn period_cost(&self, consumption: PerPeriod<KilowattHours>) -> PeriodCost {
        let costs = (consumption * self.prices).map(Cost::round_to_cents);
        PeriodCost {
            peak: costs.peak,
            valley: costs.valley,
            flat: costs.flat,
            total: costs.total().round_to_cents(),
        }
    }
}

impl PeriodCost {
    pub const fn by_period(&self) -> PerPeriod<Cost> {
        PerPeriod::new(self.peak, self.valley, self.flat)
    }
}

/// Average unit price rounded to mills, zero when nothing was consumed.
pub fn average_price(total_cost: Cost, total_consumption: KilowattHours) -> KilowattHourRate {
    if total_consumption <= KilowattHours::ZERO {
        return KilowattHourRate::ZERO;
    }
    (total_cost / total_consumption).round_to_mills()
}
