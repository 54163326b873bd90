//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Creates a new interval.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Gets the magnitude of the interval.
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Linearly interpolates between the interval's end points.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }
}

impl Debug for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let iv = Interval::new(2.0, 5.0);
        assert!(iv.contains(2.0));
        assert!(iv.contains(5.0));
        assert!(iv.contains(3.5));
        assert!(!iv.contains(1.9));
        assert!(!iv.contains(5.1));
    }

    #[test]
    fn lerp_endpoints() {
        let iv = Interval::new(4.0, 8.0);
        assert_eq!(iv.lerp(0.0), 4.0);
        assert_eq!(iv.lerp(1.0), 8.0);
        assert_eq!(iv.lerp(0.5), 6.0);
        assert_eq!(iv.length(), 4.0);
    }
}
