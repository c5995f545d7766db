use chrono::{DateTime, Local, TimeZone};
use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use sunledger_quantities::{cost::Cost, energy::KilowattHours, percent::Percent};

use crate::tariff::{Period, Tariff};

/// Share of the generation consumed on site when nothing better is known.
pub const DEFAULT_SELF_USE_RATIO: f64 = 0.7;

/// Revenue of generated energy split by where it comes from.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Add, AddAssign)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBreakdown {
    /// Avoided purchase at the period price.
    pub self_use: Cost,

    /// Exported energy at the feed-in price.
    pub grid: Cost,

    /// Generation subsidy, paid on all the energy.
    pub subsidy: Cost,
}

impl RevenueBreakdown {
    /// Sum of the components rounded to cents.
    pub fn total(self) -> Cost {
        (self.self_use + self.grid + self.subsidy).round_to_cents()
    }

    pub fn round_to_cents(self) -> Self {
        Self {
            self_use: self.self_use.round_to_cents(),
            grid: self.grid.round_to_cents(),
            subsidy: self.subsidy.round_to_cents(),
        }
    }
}

/// Generation over one sampling step and its revenue.
#[serde_as]
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: DateTime<Local>,

    pub energy: KilowattHours,
    pub revenue: Cost,
    pub self_use_energy: KilowattHours,

    /// Energy exported to the grid.
    pub grid_energy: KilowattHours,

    pub period: Period,
}

impl Tariff {
    /// Unrounded revenue components of the energy generated at the timestamp.
    ///
    /// `self_use_ratio` is the consumed share in `0..=1`. It is taken as is, so that a ratio
    /// outside the range extrapolates linearly. Non-positive energy earns nothing.
    pub fn revenue_breakdown<Tz: TimeZone>(
        &self,
        energy: KilowattHours,
        at: &DateTime<Tz>,
        self_use_ratio: f64,
    ) -> RevenueBreakdown {
        if energy <= KilowattHours::ZERO {
            return RevenueBreakdown::default();
        }
        RevenueBreakdown {
            self_use: energy * self_use_ratio * self.price_at(at),
            grid: energy * (1.0 - self_use_ratio) * self.grid_price,
            subsidy: energy * self.subsidy_price,
        }
    }

    /// Blended revenue of the energy generated at the timestamp, rounded to cents.
    pub fn revenue<Tz: TimeZone>(
        &self,
        energy: KilowattHours,
        at: &DateTime<Tz>,
        self_use_ratio: f64,
    ) -> Cost {
        self.revenue_breakdown(energy, at, self_use_ratio).total()
    }

    /// Build a revenue point, clamping the energy to non-negative and the ratio to `0..=1`.
    ///
    /// The revenue is priced from the unrounded energy. The reported energies are rounded to
    /// hundredths, the exported part being the remainder of the self-used one.
    pub fn revenue_point(
        &self,
        timestamp: DateTime<Local>,
        energy: KilowattHours,
        self_use_ratio: f64,
    ) -> RevenuePoint {
        let energy = energy.max(KilowattHours::ZERO);
        let self_use_ratio = self_use_ratio.clamp(0.0, 1.0);
        let revenue = self.revenue(energy, &timestamp, self_use_ratio);
        let energy = energy.round_to_hundredths();
        let self_use_energy = (energy * self_use_ratio).round_to_hundredths();
        RevenuePoint {
            timestamp,
            energy,
            revenue,
            self_use_energy,
            grid_energy: (energy - self_use_energy).round_to_hundredths(),
            period: self.classify(&timestamp),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[display("up")]
    Up,

    #[display("down")]
    Down,

    #[display("stable")]
    Stable,
}

impl Trend {
    const THRESHOLD: f64 = 5.0;

    /// Compare the values with a ±5% dead band.
    pub fn between(current: Cost, previous: Cost) -> Self {
        if previous <= Cost::ZERO {
            return if current > Cost::ZERO { Self::Up } else { Self::Stable };
        }
        let change = change_rate(current, previous).0.0;
        if change > Self::THRESHOLD {
            Self::Up
        } else if change < -Self::THRESHOLD {
            Self::Down
        } else {
            Self::Stable
        }
    }
}

/// Relative change in percent, unrounded. Zero against a non-positive base.
pub fn change_rate(current: Cost, previous: Cost) -> Percent {
    if previous <= Cost::ZERO {
        return Percent::ZERO;
    }
    Percent::from((current - previous) / previous) * 100.0
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::tariff::{TariffConfig, tests::local};

    fn tariff() -> Tariff {
        Tariff::try_from(TariffConfig::default()).unwrap()
    }

    #[test]
    fn test_revenue() {
        // 10 kWh in peak hours: 7 × 0.8 + 3 × 0.35 + 10 × 0.42 = 5.6 + 1.05 + 4.2.
        let revenue = tariff().revenue(KilowattHours::from(10.0), &local(9, 0), 0.7);
        assert_abs_diff_eq!(revenue.0.0, 10.85);
    }

    #[test]
    fn test_revenue_without_subsidy() {
        let tariff = Tariff::try_from(TariffConfig {
            subsidy_price: None,
            grid_price: None,
            ..TariffConfig::default()
        })
        .unwrap();
        // 4 kWh in valley hours, all of it exported:
        let revenue = tariff.revenue(KilowattHours::from(4.0), &local(3, 0), 0.0);
        assert_abs_diff_eq!(revenue.0.0, 1.4);
    }

    #[test]
    fn test_revenue_non_positive() {
        assert_eq!(tariff().revenue(KilowattHours::ZERO, &local(9, 0), 0.7), Cost::ZERO);
        assert_eq!(tariff().revenue(KilowattHours::from(-1.0), &local(9, 0), 0.7), Cost::ZERO);
    }

    #[test]
    fn test_breakdown() {
        let breakdown = tariff()
            .revenue_breakdown(KilowattHours::from(10.0), &local(13, 0), 0.5)
            .round_to_cents();
        assert_abs_diff_eq!(breakdown.self_use.0.0, 2.5);
        assert_abs_diff_eq!(breakdown.grid.0.0, 1.75);
        assert_abs_diff_eq!(breakdown.subsidy.0.0, 4.2);
        assert_abs_diff_eq!(breakdown.total().0.0, 8.45);
    }

    #[test]
    fn test_revenue_point() {
        let point = tariff().revenue_point(local(9, 0), KilowattHours::from(33.333), 0.8);
        assert_abs_diff_eq!(point.energy.0.0, 33.33);
        assert_abs_diff_eq!(point.self_use_energy.0.0, 26.66);
        assert_abs_diff_eq!(point.grid_energy.0.0, 6.67);
        assert_abs_diff_eq!(
            (point.self_use_energy + point.grid_energy).0.0,
            point.energy.0.0,
            epsilon = 1e-9,
        );
        assert_eq!(point.period, Period::Peak);
    }

    #[test]
    fn test_revenue_point_prices_unrounded_energy() {
        // 1.014 × (0.8 + 0.42) = 1.23708, while the reported 1.01 kWh would earn 1.2322:
        let point = tariff().revenue_point(local(9, 0), KilowattHours::from(1.014), 1.0);
        assert_eq!(point.energy, KilowattHours::from(1.01));
        assert_abs_diff_eq!(point.revenue.0.0, 1.24);
    }

    #[test]
    fn test_revenue_point_clamped() {
        let point = tariff().revenue_point(local(9, 0), KilowattHours::from(-2.0), 1.5);
        assert_eq!(point.energy, KilowattHours::ZERO);
        assert_eq!(point.revenue, Cost::ZERO);
        assert_eq!(point.grid_energy, KilowattHours::ZERO);

        let point = tariff().revenue_point(local(9, 0), KilowattHours::from(10.0), 1.5);
        assert_eq!(point.self_use_energy, KilowattHours::from(10.0));
        assert_eq!(point.grid_energy, KilowattHours::ZERO);
    }

    #[test]
    fn test_trend() {
        assert_eq!(Trend::between(Cost::from(106.0), Cost::from(100.0)), Trend::Up);
        assert_eq!(Trend::between(Cost::from(105.0), Cost::from(100.0)), Trend::Stable);
        assert_eq!(Trend::between(Cost::from(95.0), Cost::from(100.0)), Trend::Stable);
        assert_eq!(Trend::between(Cost::from(94.0), Cost::from(100.0)), Trend::Down);
    }

    #[test]
    fn test_trend_without_previous() {
        assert_eq!(Trend::between(Cost::from(1.0), Cost::ZERO), Trend::Up);
        assert_eq!(Trend::between(Cost::ZERO, Cost::ZERO), Trend::Stable);
        assert_eq!(change_rate(Cost::from(1.0), Cost::ZERO), Percent::ZERO);
    }
}
