use std::fmt::{Debug, Display, Formatter};

use crate::Quantity;

/// Dimensionless share in percent, `0..=100` for the rates this crate deals with.
pub type Percent = Quantity<0, 0>;

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}
