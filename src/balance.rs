use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use sunledger_quantities::{energy::KilowattHours, percent::Percent};

/// Where the generated and consumed energy went.
///
/// Negative readings are taken as they come: only the grid directions are clamped at zero.
/// Every field is rounded to hundredths.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyFlow {
    /// Generated energy consumed on site.
    pub self_use: KilowattHours,

    /// Surplus generation exported to the grid.
    pub grid_feed: KilowattHours,

    /// Shortfall imported from the grid.
    pub grid_draw: KilowattHours,

    /// Share of the generation consumed on site.
    pub self_use_rate: Percent,
}

impl EnergyFlow {
    pub fn new(generation: KilowattHours, consumption: KilowattHours) -> Self {
        let self_use = generation.min(consumption);
        let self_use_rate = if generation > KilowattHours::ZERO && consumption > KilowattHours::ZERO
        {
            (Percent::from(self_use / generation) * 100.0).round_to(2)
        } else {
            Percent::ZERO
        };
        Self {
            self_use: self_use.round_to_hundredths(),
            grid_feed: (generation - consumption).max(KilowattHours::ZERO).round_to_hundredths(),
            grid_draw: (consumption - generation).max(KilowattHours::ZERO).round_to_hundredths(),
            self_use_rate,
        }
    }
}

/// Generation against consumption at a point in time.
#[serde_as]
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBalance {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: DateTime<Local>,

    pub generation: KilowattHours,
    pub consumption: KilowattHours,

    #[serde(flatten)]
    pub flow: EnergyFlow,
}

impl EnergyBalance {
    pub fn new(
        generation: KilowattHours,
        consumption: KilowattHours,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            timestamp,
            generation: generation.round_to_hundredths(),
            consumption: consumption.round_to_hundredths(),
            flow: EnergyFlow::new(generation, consumption),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::tariff::tests::local;

    #[test]
    fn test_surplus() {
        let balance =
            EnergyBalance::new(KilowattHours::from(100.0), KilowattHours::from(60.0), local(12, 0));
        assert_eq!(balance.flow.self_use, KilowattHours::from(60.0));
        assert_eq!(balance.flow.grid_feed, KilowattHours::from(40.0));
        assert_eq!(balance.flow.grid_draw, KilowattHours::ZERO);
        assert_abs_diff_eq!(balance.flow.self_use_rate.0.0, 60.0);
    }

    #[test]
    fn test_shortfall() {
        let flow = EnergyFlow::new(KilowattHours::from(30.0), KilowattHours::from(45.5));
        assert_eq!(flow.self_use, KilowattHours::from(30.0));
        assert_eq!(flow.grid_feed, KilowattHours::ZERO);
        assert_abs_diff_eq!(flow.grid_draw.0.0, 15.5);
        assert_abs_diff_eq!(flow.self_use_rate.0.0, 100.0);
    }

    #[test]
    fn test_no_generation() {
        let flow = EnergyFlow::new(KilowattHours::ZERO, KilowattHours::from(10.0));
        assert_eq!(flow.self_use, KilowattHours::ZERO);
        assert_eq!(flow.grid_draw, KilowattHours::from(10.0));
        assert_eq!(flow.self_use_rate, Percent::ZERO);
    }

    #[test]
    fn test_no_consumption() {
        let flow = EnergyFlow::new(KilowattHours::from(10.0), KilowattHours::ZERO);
        assert_eq!(flow.grid_feed, KilowattHours::from(10.0));
        assert_eq!(flow.self_use_rate, Percent::ZERO);
    }

    #[test]
    fn test_negative_generation() {
        let balance =
            EnergyBalance::new(KilowattHours::from(-5.0), KilowattHours::from(10.0), local(3, 0));
        assert_eq!(balance.generation, KilowattHours::from(-5.0));
        assert_eq!(balance.flow.self_use, KilowattHours::from(-5.0));
        assert_eq!(balance.flow.grid_feed, KilowattHours::ZERO);
        assert_eq!(balance.flow.grid_draw, KilowattHours::from(15.0));
        assert_eq!(balance.flow.self_use_rate, Percent::ZERO);
    }

    #[test]
    fn test_negative_consumption() {
        let flow = EnergyFlow::new(KilowattHours::from(4.0), KilowattHours::from(-1.0));
        assert_eq!(flow.self_use, KilowattHours::from(-1.0));
        assert_eq!(flow.grid_feed, KilowattHours::from(5.0));
        assert_eq!(flow.grid_draw, KilowattHours::ZERO);
        assert_eq!(flow.self_use_rate, Percent::ZERO);
    }

    #[test]
    fn test_rate_rounding() {
        let flow = EnergyFlow::new(KilowattHours::from(3.0), KilowattHours::from(1.0));
        assert_abs_diff_eq!(flow.self_use_rate.0.0, 33.33);
    }

    #[test]
    fn test_serde_flattened() {
        let balance =
            EnergyBalance::new(KilowattHours::from(10.0), KilowattHours::from(4.0), local(12, 0));
        let json = serde_json::to_value(balance).unwrap();
        assert_eq!(json["selfUse"], 4.0);
        assert_eq!(json["gridFeed"], 6.0);
        assert_eq!(json["selfUseRate"], 40.0);
        assert_eq!(serde_json::from_value::<EnergyBalance>(json).unwrap(), balance);
    }
}
