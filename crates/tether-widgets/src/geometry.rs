#![forbid(unsafe_code)]

//! Geometry value types.

use std::fmt;

/// A point in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise equality where NaN matches NaN.
    #[must_use]
    pub fn same(a: Self, b: Self) -> bool {
        same_value(a.x, b.x) && same_value(a.y, b.y)
    }
}

/// `a == b`, except that two NaNs are the same value.
#[must_use]
pub fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
