use std::fmt::{Debug, Display, Formatter};

use crate::Quantity;

/// Yuan per kilowatt-hour.
pub type KilowattHourRate = Quantity<-1, 1>;

impl KilowattHourRate {
    /// Round the rate to [mills][1].
    ///
    /// [1]: https://en.wikipedia.org/wiki/Mill_(currency)
    pub fn round_to_mills(self) -> Self {
        self.round_to(3)
    }
}

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{:.3}/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{:.3}/kWh", self.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_round_to_mills() {
        assert_abs_diff_eq!(KilowattHourRate::from(0.0315).round_to_mills().0.0, 0.032);
    }

    #[test]
    fn test_display() {
        assert_eq!(KilowattHourRate::from(0.35).to_string(), "¥0.350/kWh");
    }
}
