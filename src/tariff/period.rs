use std::ops::{Add, Mul};

use comfy_table::Color;
use derive_more::AddAssign;
use serde::{Deserialize, Serialize};

/// Time-of-use tariff period.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Deserialize,
    Serialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Highest unit price.
    #[display("peak")]
    Peak,

    /// Lowest unit price.
    #[display("valley")]
    Valley,

    /// Medium unit price, also the fallback for the hours not listed elsewhere.
    #[display("flat")]
    Flat,
}

impl Period {
    pub const ALL: [Self; 3] = [Self::Peak, Self::Valley, Self::Flat];

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Peak => Color::Red,
            Self::Valley => Color::Green,
            Self::Flat => Color::DarkYellow,
        }
    }
}

/// One value per [`Period`].
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, AddAssign)]
pub struct PerPeriod<T> {
    pub peak: T,
    pub valley: T,
    pub flat: T,
}

impl<T> PerPeriod<T> {
    pub const fn new(peak: T, valley: T, flat: T) -> Self {
        Self { peak, valley, flat }
    }

    pub const fn get(&self, period: Period) -> &T {
        match period {
            Period::Peak => &self.peak,
            Period::Valley => &self.valley,
            Period::Flat => &self.flat,
        }
    }

    pub const fn get_mut(&mut self, period: Period) -> &mut T {
        match period {
            Period::Peak => &mut self.peak,
            Period::Valley => &mut self.valley,
            Period::Flat => &mut self.flat,
        }
    }

    pub fn map<R>(self, mut f: impl FnMut(T) -> R) -> PerPeriod<R> {
        PerPeriod { peak: f(self.peak), valley: f(self.valley), flat: f(self.flat) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &T)> {
        Period::ALL.into_iter().map(move |period| (period, self.get(period)))
    }
}

impl<T: Add<Output = T>> PerPeriod<T> {
    pub fn total(self) -> T {
        self.peak + self.valley + self.flat
    }
}

impl<T: Mul<Rhs>, Rhs> Mul<PerPeriod<Rhs>> for PerPeriod<T> {
    type Output = PerPeriod<<T as Mul<Rhs>>::Output>;

    fn mul(self, rhs: PerPeriod<Rhs>) -> Self::Output {
        PerPeriod {
            peak: self.peak * rhs.peak,
            valley: self.valley * rhs.valley,
            flat: self.flat * rhs.flat,
        }
    }
}
