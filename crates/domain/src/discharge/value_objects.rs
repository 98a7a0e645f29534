//! Value objects for the discharge domain.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// A fuel quantity in liters.
///
/// Operator input arrives as decimals (thirds of a liter are not unusual), so
/// the value is kept as `f64`; comparisons that must absorb rounding go
/// through an explicit tolerance rather than exact equality.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Liters(f64);

impl Liters {
    /// Zero liters.
    pub const ZERO: Liters = Liters(0.0);

    /// Creates a quantity from a raw liter value.
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw liter value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the absolute quantity.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Returns true if the quantity is below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Returns true if the quantity is neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Returns true if the quantity is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for Liters {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Add for Liters {
    type Output = Liters;

    fn add(self, rhs: Liters) -> Liters {
        Liters(self.0 + rhs.0)
    }
}

impl AddAssign for Liters {
    fn add_assign(&mut self, rhs: Liters) {
        self.0 += rhs.0;
    }
}

impl Sub for Liters {
    type Output = Liters;

    fn sub(self, rhs: Liters) -> Liters {
        Liters(self.0 - rhs.0)
    }
}

impl Sum for Liters {
    fn sum<I: Iterator<Item = Liters>>(iter: I) -> Self {
        iter.fold(Liters::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Liters> for Liters {
    fn sum<I: Iterator<Item = &'a Liters>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Liters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} L", self.0)
    }
}
