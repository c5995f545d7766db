use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::{Quantity, cost::Cost, rate::KilowattHourRate};

pub type KilowattHours = Quantity<1, 0>;

impl KilowattHours {
    /// Round to hundredths of a kilowatt-hour (10 Wh).
    pub fn round_to_hundredths(self) -> Self {
        self.round_to(2)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.0.abs() >= 1000.0 {
            write!(f, "{:.2} MWh", self.0.0 / 1000.0)
        } else {
            write!(f, "{:.2} kWh", self.0)
        }
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}
