use std::{
    fmt::{Debug, Display, Formatter},
    ops::Div,
};

use crate::{Quantity, energy::KilowattHours, rate::KilowattHourRate};

pub type Cost = Quantity<0, 1>;

impl Cost {
    /// Round the cost to whole cents, the scale every amount is reported at.
    pub fn round_to_cents(self) -> Self {
        self.round_to(2)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{:.2}", self.0)
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{:.2}", self.0)
    }
}

impl Div<KilowattHours> for Cost {
    type Output = KilowattHourRate;

    fn div(self, rhs: KilowattHours) -> Self::Output {
        Quantity(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_abs_diff_eq!(Cost::from(4.0075).round_to_cents().0.0, 4.01);
        assert_abs_diff_eq!(Cost::from(0.7525).round_to_cents().0.0, 0.75);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cost::from(12.5).to_string(), "¥12.50");
    }

    #[test]
    fn test_div_energy() {
        let rate = Cost::from(3.0) / KilowattHours::from(6.0);
        assert_abs_diff_eq!(rate.0.0, 0.5);
    }
}
